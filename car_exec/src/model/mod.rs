//! # Model module
//!
//! Continuous time models of the simulated systems. A model exposes its
//! dynamics as an ordinary differential equation `dx/dt = f(t, x)` which the
//! simulation module integrates.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod car;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::SVector;

// Internal
pub use car::*;
use crate::ctrl::CtrlError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while evaluating a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("The controller failed at t = {0}: {1}")]
    Control(f64, #[source] CtrlError),

    #[error("The model produced a non-finite state derivative at t = {0}")]
    NonFinite(f64),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A dynamical system with an `N` dimensional state.
pub trait Model<const N: usize> {
    /// Dynamics of the system, the state derivative at time `t` and state
    /// `x`.
    fn ode(&self, t: f64, x: &SVector<f64, N>) -> Result<SVector<f64, N>, ModelError>;
}
