//! # Flatness based feedback controller
//!
//! Stabilises the car around the planned flat outputs. The reference is
//! reparametrised by arc length, so with `n = sqrt(1 + f'^2)`:
//!
//! ```text
//! y1_des'  = 1 / n
//! y2_des'  = f' / n
//! y2_des'' = f'' / n^2
//! ```
//!
//! and the stabilising inputs are
//!
//! ```text
//! w1 = y1_des' - k01 (y1 - y1_des)
//! w2 = y2_des'' - k12 (sin θ - y2_des') - k02 (y2 - y2_des)
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{Controller, CtrlError, FeedbackGains, FlatOutputs, FlatReference};
use crate::model::{CarInput, CarParams, CarState};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Scaling applied to the steering demand.
const STEER_SCALE: f64 = 0.9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Closed loop controller tracking the planned flat outputs.
#[derive(Debug)]
pub struct FeedbackController {
    flo: FlatOutputs,

    car: CarParams,

    gains: FeedbackGains,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FeedbackController {
    pub fn new(flo: FlatOutputs, car: CarParams, gains: FeedbackGains) -> Self {
        Self { flo, car, gains }
    }

    /// The feedback input for the given flat output references and state.
    pub fn input(&self, r: &FlatReference, x: &CarState) -> CarInput {
        let k = &self.gains;

        let y1 = x[0];
        let y2 = x[1];
        let y2_d = x[2].sin();

        let slope_sq = 1.0 + r.f[1].powi(2);
        let n = slope_sq.sqrt();

        // Reference trajectories
        let y1_des = r.g[0];
        let y1_des_d = 1.0 / n;

        let y2_des = r.f[0];
        let y2_des_d = r.f[1] / n;
        let y2_des_dd = r.f[2] / slope_sq;

        // Stabilising inputs
        let w1 = y1_des_d - k.k01 * (y1 - y1_des);
        let w2 = y2_des_dd - k.k12 * (y2_d - y2_des_d) - k.k02 * (y2 - y2_des);

        // Desired velocity along the path
        let v_des = r.g[1] * n;

        let u1 = v_des * (w1.powi(2) + y2_d.powi(2)).sqrt();
        let u2 = (STEER_SCALE * self.car.l * (w2 * w1)).atan2(1.0);

        CarInput::new(u1, u2)
    }
}

impl Controller for FeedbackController {
    fn control(&self, t: f64, x: &CarState) -> Result<CarInput, CtrlError> {
        let r = self.flo.eval(t)?;
        Ok(self.input(&r, x))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::planner::{Boundaries, BoundaryPolicy, GevreyPlanner, PolynomialPlanner};
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn controller() -> FeedbackController {
        let f = PolynomialPlanner::new(
            Boundaries::new(vec![0.0, 0.0, 0.0], vec![1.0, 0.0, 0.0], 0.0, 5.0, 2).unwrap(),
        )
        .unwrap();
        let g = GevreyPlanner::new(
            Boundaries::new(vec![0.0, 0.0], vec![5.0, 0.0], 0.0, 10.0, 1).unwrap(),
            1.5,
            BoundaryPolicy::Strict,
        )
        .unwrap();

        FeedbackController::new(
            FlatOutputs::new(Box::new(f), Box::new(g)).unwrap(),
            CarParams::with_length(0.3),
            FeedbackGains {
                k01: 1.0,
                k02: 2.0,
                k12: 3.0,
            },
        )
    }

    #[test]
    fn test_on_reference_matches_feedforward() {
        let ctrl = controller();

        // On a straight reference with no error the feedback reduces to the
        // reference velocity and no steering
        let r = FlatReference {
            f: DVector::from_vec(vec![0.0, 0.0, 0.0]),
            g: DVector::from_vec(vec![1.0, 0.5]),
        };
        let u = ctrl.input(&r, &CarState::new(1.0, 0.0, 0.0));

        assert_relative_eq!(u[0], 0.5);
        assert_relative_eq!(u[1], 0.0);
    }

    #[test]
    fn test_lateral_error_steers_back() {
        let ctrl = controller();
        let r = FlatReference {
            f: DVector::from_vec(vec![0.0, 0.0, 0.0]),
            g: DVector::from_vec(vec![1.0, 0.5]),
        };

        // Car is to the left of the reference, so it must steer right
        let u = ctrl.input(&r, &CarState::new(1.0, 0.2, 0.0));
        assert!(u[1] < 0.0);

        // And to the right it must steer left
        let u = ctrl.input(&r, &CarState::new(1.0, -0.2, 0.0));
        assert!(u[1] > 0.0);
    }

    #[test]
    fn test_control_before_start_is_at_rest() {
        let ctrl = controller();
        let u = ctrl.control(-1.0, &CarState::zeros()).unwrap();
        assert_eq!(u[0], 0.0);
    }
}
