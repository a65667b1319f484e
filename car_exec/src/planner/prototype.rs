//! # Prototype planner
//!
//! Blends the boundary values through the prototype transition function
//!
//! ```text
//! phi(τ) = (2d+1)! / (d!)^2 * Σ_{k=0}^{d} binom(d, k) (-1)^k τ^(k+d+1) / (d+k+1)
//! ```
//!
//! which is the degree `2d + 1` polynomial with `phi(0) = 0`, `phi(1) = 1` and
//! all derivatives up to order `d` vanishing at both ends.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::DVector;

// Internal
use super::{Boundaries, BoundaryPolicy, Planner, PlannerError, PlannerWarning};
use util::maths::{binomial, factorial, falling_factorial};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planner blending the boundary values with a generalised smoothstep.
#[derive(Debug, Clone)]
pub struct PrototypePlanner {
    bounds: Boundaries,

    warnings: Vec<PlannerWarning>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PrototypePlanner {
    /// Create a new prototype planner.
    ///
    /// Only `YA[0]` and `YB[0]` are interpolated, see [`BoundaryPolicy`] for
    /// how non-zero boundary derivatives are handled.
    pub fn new(bounds: Boundaries, policy: BoundaryPolicy) -> Result<Self, PlannerError> {
        let warnings = bounds.check_value_only("prototype", policy)?;

        debug!(
            "Prototype planner created on [{}, {}] with d = {}",
            bounds.t0(),
            bounds.tf(),
            bounds.order()
        );

        Ok(Self { bounds, warnings })
    }

    /// The prototype function and its derivatives `0..=d` at normalised time
    /// `tau`.
    pub fn prototype_fn(&self, tau: f64) -> DVector<f64> {
        let d = self.bounds.order() as u32;
        let scale = factorial::<f64>(2 * d + 1) / factorial::<f64>(d).powi(2);

        DVector::from_fn(d as usize + 1, |p, _| {
            let p = p as u32;

            // The p-th derivative of τ^(k+d+1) is (k+d+1)...(k+d+2-p) τ^(k+d+1-p)
            let sum: f64 = (0..=d)
                .map(|k| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    let power = (k + d + 1) as f64;

                    binomial::<f64>(d, k) * sign * tau.powi((k + d + 1 - p) as i32) / power
                        * falling_factorial(power, p)
                })
                .sum();

            scale * sum
        })
    }
}

impl Planner for PrototypePlanner {
    fn boundaries(&self) -> &Boundaries {
        &self.bounds
    }

    fn eval_interior(&self, t: f64) -> Result<DVector<f64>, PlannerError> {
        let phi = self.prototype_fn(self.bounds.normalise(t));
        Ok(self.bounds.blend(&phi))
    }

    fn warnings(&self) -> &[PlannerWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn planner(d: usize) -> PrototypePlanner {
        let mut yb = vec![0.0; d + 1];
        yb[0] = 1.0;
        let b = Boundaries::new(vec![0.0; d + 1], yb, 0.0, 1.0, d).unwrap();
        PrototypePlanner::new(b, BoundaryPolicy::Strict).unwrap()
    }

    #[test]
    fn test_prototype_fn_endpoints() {
        for d in 0..6 {
            let p = planner(d);

            let phi_0 = p.prototype_fn(0.0);
            let phi_1 = p.prototype_fn(1.0);

            assert_relative_eq!(phi_0[0], 0.0, epsilon = 1e-12);
            assert_relative_eq!(phi_1[0], 1.0, epsilon = 1e-9);

            for i in 1..=d {
                assert_relative_eq!(phi_0[i], 0.0, epsilon = 1e-9);
                assert_relative_eq!(phi_1[i], 0.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_prototype_fn_smoothstep() {
        // d = 1 is the classic smoothstep 3τ^2 - 2τ^3
        let p = planner(1);
        for &tau in &[0.2, 0.5, 0.7] {
            let phi = p.prototype_fn(tau);
            assert_relative_eq!(phi[0], 3.0 * tau * tau - 2.0 * tau.powi(3), epsilon = 1e-12);
            assert_relative_eq!(phi[1], 6.0 * tau - 6.0 * tau * tau, epsilon = 1e-12);
        }

        // d = 2 is 10τ^3 - 15τ^4 + 6τ^5
        let p = planner(2);
        let tau: f64 = 0.3;
        let phi = p.prototype_fn(tau);
        assert_relative_eq!(
            phi[0],
            10.0 * tau.powi(3) - 15.0 * tau.powi(4) + 6.0 * tau.powi(5),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            phi[2],
            60.0 * tau - 180.0 * tau.powi(2) + 120.0 * tau.powi(3),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_time_scaling() {
        let b = Boundaries::new(vec![2.0, 0.0], vec![6.0, 0.0], 1.0, 3.0, 1).unwrap();
        let p = PrototypePlanner::new(b, BoundaryPolicy::Relaxed).unwrap();

        // Midpoint: value halfway, slope = 4 * 1.5 / 2
        let y = p.eval(2.0).unwrap();
        assert_relative_eq!(y[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(y[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ignored_derivatives_warn() {
        let b = Boundaries::new(vec![0.0, 1.0], vec![1.0, 0.0], 0.0, 1.0, 1).unwrap();
        let p = PrototypePlanner::new(b.clone(), BoundaryPolicy::Relaxed).unwrap();
        assert_eq!(p.warnings().len(), 1);

        // The derivative boundary condition is not enforced
        assert_eq!(p.eval(0.0).unwrap().as_slice(), &[0.0, 0.0]);

        assert!(matches!(
            PrototypePlanner::new(b, BoundaryPolicy::Strict),
            Err(PlannerError::Configuration(_))
        ));
    }
}
