//! # Kinematic car model
//!
//! The three states of the system are:
//!
//! - `x1` - horizontal position
//! - `x2` - vertical position
//! - `θ`  - orientation in the plane
//!
//! The inputs to the system are the velocity of the car `u1` and the
//! steering angle of the front wheels `u2`. With wheelbase `l` the dynamics
//! are
//!
//! ```text
//! x1' = u1 cos θ
//! x2' = u1 sin θ
//! θ'  = u1 tan(u2) / l
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

// Internal
use super::{Model, ModelError};
use crate::ctrl::Controller;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Ratio between the width and the length of the car.
pub const WIDTH_RATIO: f64 = 0.3;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// State of the car, `[x1, x2, θ]`.
pub type CarState = Vector3<f64>;

/// Input to the car, `[u1, u2]`.
pub type CarInput = Vector2<f64>;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the car.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CarParams {
    /// Length of the vehicle (wheelbase).
    ///
    /// Units: meters
    pub l: f64,

    /// Width of the vehicle, only used for visualisation.
    ///
    /// Units: meters
    #[serde(default)]
    pub w: f64,
}

/// The car together with the controller driving it.
#[derive(Debug)]
pub struct Car<C> {
    pub params: CarParams,

    pub controller: C,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CarParams {
    /// Parameters for a car of length `l`, the width is derived from the
    /// length.
    pub fn with_length(l: f64) -> Self {
        Self {
            l,
            w: l * WIDTH_RATIO,
        }
    }
}

impl<C: Controller> Car<C> {
    pub fn new(params: CarParams, controller: C) -> Self {
        Self { params, controller }
    }

    /// The state derivative for a given input.
    pub fn dynamics(&self, x: &CarState, u: &CarInput) -> CarState {
        let theta = x[2];

        CarState::new(
            u[0] * theta.cos(),
            u[0] * theta.sin(),
            u[0] * u[1].tan() / self.params.l,
        )
    }
}

impl<C: Controller> Model<3> for Car<C> {
    fn ode(&self, t: f64, x: &CarState) -> Result<CarState, ModelError> {
        let u = self
            .controller
            .control(t, x)
            .map_err(|e| ModelError::Control(t, e))?;

        let dxdt = self.dynamics(x, &u);

        if dxdt.iter().all(|v| v.is_finite()) {
            Ok(dxdt)
        } else {
            Err(ModelError::NonFinite(t))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctrl::ConstantController;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_with_length() {
        let p = CarParams::with_length(0.3);
        assert_relative_eq!(p.w, 0.09);
    }

    #[test]
    fn test_dynamics() {
        let car = Car::new(CarParams::with_length(0.5), ConstantController::default());

        // Straight ahead along x
        let dx = car.dynamics(&CarState::new(0.0, 0.0, 0.0), &CarInput::new(2.0, 0.0));
        assert_relative_eq!(dx, CarState::new(2.0, 0.0, 0.0));

        // Pointing along y, turning
        let dx = car.dynamics(
            &CarState::new(1.0, 1.0, FRAC_PI_2),
            &CarInput::new(1.0, 0.25),
        );
        assert_relative_eq!(dx[0], 0.0, epsilon = 1e-15);
        assert_relative_eq!(dx[1], 1.0);
        assert_relative_eq!(dx[2], 0.25f64.tan() / 0.5);
    }

    #[test]
    fn test_ode_uses_controller() {
        let car = Car::new(CarParams::with_length(0.3), ConstantController::default());

        // At t = 2 the constant controller drives at 0.8 m/s
        let dx = car.ode(2.0, &CarState::zeros()).unwrap();
        assert_relative_eq!(dx[0], 0.8);
        assert_relative_eq!(dx[2], 0.8 * 0.25f64.tan() / 0.3);
    }
}
