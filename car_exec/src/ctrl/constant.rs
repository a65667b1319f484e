//! Open loop controller with a decaying velocity and a fixed steering angle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{Controller, CtrlError};
use crate::model::{CarInput, CarState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives with the velocity `u1 = max(0, v0 - decay * t)` and a constant
/// steering angle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ConstantController {
    /// Initial velocity
    ///
    /// Units: meters/second
    pub v0_ms: f64,

    /// Linear velocity decay
    ///
    /// Units: meters/second^2
    pub decay_mss: f64,

    /// Steering angle of the front wheels
    ///
    /// Units: radians
    pub steer_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ConstantController {
    fn default() -> Self {
        Self {
            v0_ms: 1.0,
            decay_mss: 0.1,
            steer_rad: 0.25,
        }
    }
}

impl Controller for ConstantController {
    fn control(&self, t: f64, _x: &CarState) -> Result<CarInput, CtrlError> {
        // Linearly decreasing velocity, which is positive or zero for all time
        let u1 = (self.v0_ms - self.decay_mss * t).max(0.0);

        Ok(CarInput::new(u1, self.steer_rad))
    }
}
