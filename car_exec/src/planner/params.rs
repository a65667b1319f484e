//! Trajectory planner parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{
    Boundaries, BoundaryPolicy, GevreyPlanner, Planner, PlannerError, PolynomialPlanner,
    PrototypePlanner,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing a single planned trajectory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlannerParams {
    /// Which planner to use
    pub kind: PlannerKind,

    /// Smoothness order `d`
    pub order: usize,

    /// Start time
    pub t0: f64,

    /// Final time
    pub tf: f64,

    /// Start state, `order + 1` elements
    pub ya: Vec<f64>,

    /// Final state, `order + 1` elements
    pub yb: Vec<f64>,

    /// Handling of non-zero boundary derivatives for planners which only
    /// interpolate the boundary values.
    #[serde(default)]
    pub policy: BoundaryPolicy,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The available planners.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannerKind {
    Polynomial,

    Prototype,

    /// Gevrey planner with order `s > 1`
    Gevrey { s: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlannerParams {
    /// Build the planner described by these parameters.
    pub fn build(&self) -> Result<Box<dyn Planner>, PlannerError> {
        let bounds = Boundaries::new(
            self.ya.clone(),
            self.yb.clone(),
            self.t0,
            self.tf,
            self.order,
        )?;

        Ok(match self.kind {
            PlannerKind::Polynomial => Box::new(PolynomialPlanner::new(bounds)?),
            PlannerKind::Prototype => Box::new(PrototypePlanner::new(bounds, self.policy)?),
            PlannerKind::Gevrey { s } => Box::new(GevreyPlanner::new(bounds, s, self.policy)?),
        })
    }
}
