//! Behaviour shared by all transition planners.

use approx::assert_relative_eq;
use car_lib::planner::{
    Boundaries, BoundaryPolicy, GevreyPlanner, Planner, PlannerError, PlannerKind, PlannerParams,
    PolynomialPlanner, PrototypePlanner,
};

/// The reference transition from rest at 0 to rest at 1 over `[0, 1]`.
fn reference(kind: PlannerKind) -> Box<dyn Planner> {
    PlannerParams {
        kind,
        order: 2,
        t0: 0.0,
        tf: 1.0,
        ya: vec![0.0, 0.0, 0.0],
        yb: vec![1.0, 0.0, 0.0],
        policy: BoundaryPolicy::Strict,
    }
    .build()
    .unwrap()
}

fn all_reference() -> Vec<Box<dyn Planner>> {
    vec![
        reference(PlannerKind::Polynomial),
        reference(PlannerKind::Prototype),
        reference(PlannerKind::Gevrey { s: 1.1 }),
        reference(PlannerKind::Gevrey { s: 1.9 }),
    ]
}

/// Planners on a shifted interval between two non-trivial values.
fn all_shifted() -> Vec<Box<dyn Planner>> {
    let bounds = || Boundaries::new(vec![-2.0, 0.0, 0.0], vec![3.0, 0.0, 0.0], 2.0, 6.0, 2).unwrap();

    vec![
        Box::new(PolynomialPlanner::new(bounds()).unwrap()),
        Box::new(PrototypePlanner::new(bounds(), BoundaryPolicy::Strict).unwrap()),
        Box::new(GevreyPlanner::new(bounds(), 1.5, BoundaryPolicy::Strict).unwrap()),
    ]
}

#[test]
fn rest_outside_interval() {
    for planner in all_shifted() {
        for &t in &[-100.0, 0.0, 1.999] {
            assert_eq!(planner.eval(t).unwrap().as_slice(), &[-2.0, 0.0, 0.0], "{:?}", planner);
        }
        for &t in &[6.001, 10.0, 1e9] {
            assert_eq!(planner.eval(t).unwrap().as_slice(), &[3.0, 0.0, 0.0], "{:?}", planner);
        }
    }
}

#[test]
fn exact_boundaries() {
    for planner in all_shifted() {
        assert_eq!(planner.eval(2.0).unwrap().as_slice(), &[-2.0, 0.0, 0.0]);
        assert_eq!(planner.eval(6.0).unwrap().as_slice(), &[3.0, 0.0, 0.0]);
    }
}

#[test]
fn polynomial_matches_boundary_derivatives() {
    let ya = vec![0.5, -1.0, 2.0, 0.0];
    let yb = vec![2.0, 0.5, -3.0, 1.0];
    let planner =
        PolynomialPlanner::new(Boundaries::new(ya.clone(), yb.clone(), -1.0, 2.0, 3).unwrap())
            .unwrap();

    assert_eq!(planner.eval(-1.0).unwrap().as_slice(), ya.as_slice());
    assert_eq!(planner.eval(2.0).unwrap().as_slice(), yb.as_slice());

    // The fitted polynomial approaches the boundary derivatives from inside
    let eps = 1e-7;
    let start = planner.eval(-1.0 + eps).unwrap();
    let end = planner.eval(2.0 - eps).unwrap();
    for i in 0..4 {
        assert_relative_eq!(start[i], ya[i], epsilon = 1e-5);
        assert_relative_eq!(end[i], yb[i], epsilon = 1e-5);
    }
}

#[test]
fn continuous_at_boundaries() {
    let eps = 1e-9;

    for planner in all_shifted() {
        let inside = planner.eval(2.0 + eps).unwrap();
        let outside = planner.eval(2.0 - eps).unwrap();
        for i in 0..3 {
            assert_relative_eq!(inside[i], outside[i], epsilon = 1e-6);
        }

        let inside = planner.eval(6.0 - eps).unwrap();
        let outside = planner.eval(6.0 + eps).unwrap();
        for i in 0..3 {
            assert_relative_eq!(inside[i], outside[i], epsilon = 1e-6);
        }
    }
}

#[test]
fn late_interval_matches_prototype() {
    // A segment planned well into a run, rest to rest with d = 3, where the
    // polynomial and the prototype function coincide
    for &t0 in &[100.0, 1000.0] {
        let bounds =
            || Boundaries::new(vec![0.0; 4], vec![1.0, 0.0, 0.0, 0.0], t0, t0 + 1.0, 3).unwrap();
        let poly = PolynomialPlanner::new(bounds()).unwrap();
        let proto = PrototypePlanner::new(bounds(), BoundaryPolicy::Strict).unwrap();

        for &dt in &[0.2, 0.5, 0.9] {
            let y_poly = poly.eval(t0 + dt).unwrap();
            let y_proto = proto.eval(t0 + dt).unwrap();
            for i in 0..4 {
                assert_relative_eq!(y_poly[i], y_proto[i], epsilon = 1e-6);
            }
        }

        let eps = 1e-9;
        for &(inside, outside) in &[(t0 + eps, t0 - eps), (t0 + 1.0 - eps, t0 + 1.0 + eps)] {
            let y_in = poly.eval(inside).unwrap();
            let y_out = poly.eval(outside).unwrap();
            for i in 0..4 {
                assert_relative_eq!(y_in[i], y_out[i], epsilon = 1e-5);
            }
        }
    }
}

#[test]
fn evaluation_is_idempotent() {
    for planner in all_reference() {
        for &t in &[0.1, 0.33, 0.5, 0.9] {
            assert_eq!(planner.eval(t).unwrap(), planner.eval(t).unwrap());
        }
    }
}

#[test]
fn eval_vec_matches_eval() {
    let times = [-0.5, 0.0, 0.2, 0.5, 0.75, 1.0, 1.5];

    for planner in all_reference() {
        let samples = planner.eval_vec(&times).unwrap();

        assert_eq!(samples.nrows(), times.len());
        assert_eq!(samples.ncols(), 3);

        for (k, &t) in times.iter().enumerate() {
            let y = planner.eval(t).unwrap();
            for i in 0..3 {
                assert_eq!(samples[(k, i)], y[i]);
            }
        }
    }

    // No samples is not an error
    let planner = reference(PlannerKind::Polynomial);
    assert_eq!(planner.eval_vec(&[]).unwrap().nrows(), 0);
}

#[test]
fn reference_transition() {
    for planner in all_reference() {
        // All planners are symmetric about the midpoint
        let y = planner.eval(0.5).unwrap();
        assert_relative_eq!(y[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(y[2], 0.0, epsilon = 1e-9);

        let a = planner.eval(0.3).unwrap();
        let b = planner.eval(0.7).unwrap();
        assert_relative_eq!(a[0], 1.0 - b[0], epsilon = 1e-12);
        assert_relative_eq!(a[1], b[1], epsilon = 1e-9);
    }

    // The polynomial and the prototype both give the quintic 10τ³ - 15τ⁴ + 6τ⁵
    let poly = reference(PlannerKind::Polynomial);
    let proto = reference(PlannerKind::Prototype);
    for &t in &[0.1_f64, 0.25, 0.6, 0.95] {
        let expected = 10.0 * t.powi(3) - 15.0 * t.powi(4) + 6.0 * t.powi(5);
        assert_relative_eq!(poly.eval(t).unwrap()[0], expected, epsilon = 1e-12);
        assert_relative_eq!(proto.eval(t).unwrap()[0], expected, epsilon = 1e-12);
    }
}

#[test]
fn gevrey_is_monotonic_and_finite() {
    for &s in &[1.1, 1.9] {
        let planner = reference(PlannerKind::Gevrey { s });

        let times: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        let samples = planner.eval_vec(&times).unwrap();

        assert!(samples.iter().all(|v| v.is_finite()));

        for k in 1..times.len() {
            assert!(samples[(k, 0)] >= samples[(k - 1, 0)]);
            assert!(samples[(k, 1)] >= 0.0);
        }
    }
}

#[test]
fn invalid_construction() {
    let bounds = || Boundaries::new(vec![0.0, 0.0], vec![1.0, 0.0], 0.0, 1.0, 1).unwrap();

    assert!(matches!(
        GevreyPlanner::new(bounds(), 1.0, BoundaryPolicy::Relaxed),
        Err(PlannerError::InvalidParameter(_))
    ));
    assert!(matches!(
        Boundaries::new(vec![0.0, 0.0], vec![1.0, 0.0], 1.0, 1.0, 1),
        Err(PlannerError::DegenerateInterval { .. })
    ));
    assert!(matches!(
        Boundaries::new(vec![0.0, 0.0], vec![1.0], 0.0, 1.0, 1),
        Err(PlannerError::BoundaryLength { expected: 2, ya: 2, yb: 1 })
    ));
}

#[test]
fn boundary_policy() {
    let bounds = || Boundaries::new(vec![0.0, 1.0], vec![1.0, 0.0], 0.0, 1.0, 1).unwrap();

    // Relaxed planners ignore the derivative and say so
    let proto = PrototypePlanner::new(bounds(), BoundaryPolicy::Relaxed).unwrap();
    assert_eq!(proto.warnings().len(), 1);
    assert_eq!(proto.eval(0.0).unwrap().as_slice(), &[0.0, 0.0]);

    // Strict planners refuse them
    assert!(matches!(
        GevreyPlanner::new(bounds(), 1.5, BoundaryPolicy::Strict),
        Err(PlannerError::Configuration(_))
    ));

    // The polynomial planner always honours them
    let poly = PolynomialPlanner::new(bounds()).unwrap();
    assert!(poly.warnings().is_empty());
    assert_eq!(poly.eval(0.0).unwrap().as_slice(), &[0.0, 1.0]);
}

#[test]
fn nan_time_is_rejected() {
    for planner in all_reference() {
        assert!(matches!(planner.eval(f64::NAN), Err(PlannerError::InvalidTime(_))));
    }
}

#[test]
fn overflow_is_reported() {
    // A very large Gevrey order flattens the bump function so hard that its
    // derivatives overflow away from the midpoint
    let bounds = Boundaries::new(vec![0.0, 0.0], vec![1.0, 0.0], 0.0, 1.0, 1).unwrap();
    let planner = GevreyPlanner::new(bounds, 1e5, BoundaryPolicy::Strict).unwrap();

    match planner.eval(0.3) {
        Err(PlannerError::NumericOverflow { t }) => assert_eq!(t, 0.3),
        other => panic!("expected a numeric overflow, got {:?}", other),
    }

    // The boundaries themselves are still exact
    assert_eq!(planner.eval(0.0).unwrap().as_slice(), &[0.0, 0.0]);
    assert_eq!(planner.eval(1.0).unwrap().as_slice(), &[1.0, 0.0]);
}

#[test]
fn planners_are_shareable_between_threads() {
    let planner: std::sync::Arc<dyn Planner> =
        std::sync::Arc::from(reference(PlannerKind::Gevrey { s: 1.5 }));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let planner = planner.clone();
            std::thread::spawn(move || planner.eval(0.2 * i as f64).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), planner.eval(0.2 * i as f64).unwrap());
    }
}
