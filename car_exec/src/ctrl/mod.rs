//! # Control module
//!
//! Controllers for the kinematic car. The flatness based controllers use the
//! flat outputs `y1 = x1` and `y2 = x2` of the car. The reference trajectory
//! is parametrised as `y1 = g(t)` and `y2 = f(y1)`, so that the path shape
//! `f` and the progress along it `g` are planned independently.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod constant;
mod feedback;
mod feedforward;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DVector;

// Internal
pub use constant::*;
pub use feedback::*;
pub use feedforward::*;
pub use params::*;
use crate::model::{CarInput, CarState};
use crate::planner::{Planner, PlannerError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planned trajectories for the two flat outputs.
#[derive(Debug)]
pub struct FlatOutputs {
    /// Path shape, `y2 = f(y1)`
    pub f: Box<dyn Planner>,

    /// Progress, `y1 = g(t)`
    pub g: Box<dyn Planner>,
}

/// The flat output references at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatReference {
    /// `f` and its derivatives with respect to `y1`, evaluated at `g(t)`
    pub f: DVector<f64>,

    /// `g` and its time derivatives at `t`
    pub g: DVector<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during control.
#[derive(Debug, thiserror::Error)]
pub enum CtrlError {
    #[error("Could not evaluate the reference trajectory: {0}")]
    Planner(#[from] PlannerError),

    #[error(
        "The {planner} trajectory must be planned up to order {required}, but only has order \
         {found}"
    )]
    InsufficientOrder {
        planner: &'static str,
        required: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A controller for the car.
pub trait Controller {
    /// The control law, returns the input `[u1, u2]` for time `t` and state
    /// `x`.
    fn control(&self, t: f64, x: &CarState) -> Result<CarInput, CtrlError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn control(&self, t: f64, x: &CarState) -> Result<CarInput, CtrlError> {
        (**self).control(t, x)
    }
}

impl FlatOutputs {
    /// Create the flat outputs, checking that both planners provide enough
    /// derivatives for the flatness based control laws (`f` up to order 2,
    /// `g` up to order 1).
    pub fn new(f: Box<dyn Planner>, g: Box<dyn Planner>) -> Result<Self, CtrlError> {
        check_order("f", f.as_ref(), 2)?;
        check_order("g", g.as_ref(), 1)?;

        Ok(Self { f, g })
    }

    /// Evaluate the references at time `t`.
    pub fn eval(&self, t: f64) -> Result<FlatReference, CtrlError> {
        let g = self.g.eval(t)?;
        let f = self.f.eval(g[0])?;

        Ok(FlatReference { f, g })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_order(name: &'static str, planner: &dyn Planner, required: usize) -> Result<(), CtrlError> {
    let found = planner.boundaries().order();

    if found < required {
        Err(CtrlError::InsufficientOrder {
            planner: name,
            required,
            found,
        })
    } else {
        Ok(())
    }
}
