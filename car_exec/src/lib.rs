//! # Flatcar library.
//!
//! Trajectory planning and flatness based control of a kinematic car. The
//! binaries in this crate, and the benches and integration tests, access the
//! planners, controllers and the simulation through this library.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Controllers - open loop, feed-forward and feedback control of the car
pub mod ctrl;

/// Models - the car's ordinary differential equation
pub mod model;

/// Trajectory planners - transitions between two boundary states
pub mod planner;

/// Simulation - numerical integration of a model over time
pub mod sim;
