//! # Flatness based feed-forward controller
//!
//! With the flat outputs `y1 = g(t)`, `y2 = f(y1)` the inputs of the car
//! follow algebraically:
//!
//! ```text
//! u1 = g'(t) sqrt(1 + f'^2)
//! u2 = atan2(l f'', (1 + f'^2)^(3/2))
//! ```
//!
//! where the derivatives of `f` are taken with respect to `y1`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{Controller, CtrlError, FlatOutputs, FlatReference};
use crate::model::{CarInput, CarParams, CarState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Open loop controller tracking the planned flat outputs.
#[derive(Debug)]
pub struct FeedForwardController {
    flo: FlatOutputs,

    car: CarParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FeedForwardController {
    pub fn new(flo: FlatOutputs, car: CarParams) -> Self {
        Self { flo, car }
    }

    /// The feed-forward input for the given flat output references.
    pub fn input(&self, r: &FlatReference) -> CarInput {
        let slope_sq = 1.0 + r.f[1].powi(2);

        let u1 = r.g[1] * slope_sq.sqrt();
        let u2 = (self.car.l * r.f[2]).atan2(slope_sq.powf(1.5));

        CarInput::new(u1, u2)
    }
}

impl Controller for FeedForwardController {
    fn control(&self, t: f64, _x: &CarState) -> Result<CarInput, CtrlError> {
        let r = self.flo.eval(t)?;
        Ok(self.input(&r))
    }
}
