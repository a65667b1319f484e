//! # Trajectory planning module
//!
//! The planners in this module produce a smooth scalar reference trajectory
//! `y(t)` between two boundary states, together with its exact time
//! derivatives up to the smoothness order `d`. The flatness based controllers
//! need those derivatives to compute the car's inputs, so all of them are
//! computed analytically.
//!
//! Every planner follows the same contract:
//!
//! - Before `t0` the trajectory rests at `YA[0]` with all derivatives zero.
//! - After `tf` the trajectory rests at `YB[0]` with all derivatives zero.
//! - At exactly `t0` and `tf` the planner's effective boundary state is
//!   returned.
//! - Inside `(t0, tf)` the planner specific interpolation rule applies.
//!
//! Three planners are provided:
//!
//! - [`PolynomialPlanner`] - a degree `2d + 1` polynomial which matches all
//!   boundary derivatives exactly.
//! - [`PrototypePlanner`] - blends the boundary values with a generalised
//!   smoothstep polynomial.
//! - [`GevreyPlanner`] - blends the boundary values with a Gevrey class
//!   transition based on a hyperbolic tangent.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod gevrey;
mod params;
mod polynomial;
mod prototype;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::fmt;
use log::warn;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

// Internal
pub use gevrey::*;
pub use params::*;
pub use polynomial::*;
pub use prototype::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Validated boundary conditions shared by all planners.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundaries {
    /// Start state `[value, deriv_1, ..., deriv_d]`
    ya: DVector<f64>,

    /// Final state `[value, deriv_1, ..., deriv_d]`
    yb: DVector<f64>,

    /// Start time
    t0: f64,

    /// Final time
    tf: f64,

    /// Smoothness order, the trajectory is continuous up to the `d`-th
    /// derivative.
    d: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How planners which only interpolate the boundary values treat non-zero
/// boundary derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Ignore the derivatives and record a [`PlannerWarning`].
    Relaxed,

    /// Reject the boundary conditions with [`PlannerError::Configuration`].
    Strict,
}

/// A diagnostic raised while constructing a planner.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerWarning {
    /// Non-zero boundary derivatives were given to a planner which only
    /// interpolates the boundary values. They are treated as zero.
    IgnoredBoundaryDerivatives {
        planner: &'static str,
        ya: Vec<f64>,
        yb: Vec<f64>,
    },
}

/// Errors which can occur during planning.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(
        "Expected boundary states of length {expected} (d + 1), found YA with {ya} and YB with {yb} \
         elements"
    )]
    BoundaryLength {
        expected: usize,
        ya: usize,
        yb: usize,
    },

    #[error("The planning interval [{t0}, {tf}] is degenerate, t0 must be strictly less than tf")]
    DegenerateInterval { t0: f64, tf: f64 },

    #[error("Invalid planner configuration: {0}")]
    Configuration(String),

    #[error("Invalid planner parameter: {0}")]
    InvalidParameter(String),

    #[error("The boundary value system could not be solved")]
    SingularSystem,

    #[error("Evaluation at t = {t} produced a non-finite value")]
    NumericOverflow { t: f64 },

    #[error("Cannot evaluate a trajectory at the non-finite time {0}")]
    InvalidTime(f64),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trajectory planner.
///
/// Planners are immutable once constructed, so evaluation is a pure function
/// of the planner and the time.
pub trait Planner: fmt::Debug + Send + Sync {
    /// The boundary conditions the planner was built with.
    fn boundaries(&self) -> &Boundaries;

    /// Evaluate the interpolation rule at a time strictly inside `(t0, tf)`.
    ///
    /// Callers should use [`Planner::eval`], which handles the boundaries and
    /// checks the result.
    fn eval_interior(&self, t: f64) -> Result<DVector<f64>, PlannerError>;

    /// The state returned at exactly `t0`.
    fn start_state(&self) -> DVector<f64> {
        self.boundaries().rest_state(self.boundaries().ya[0])
    }

    /// The state returned at exactly `tf`.
    fn end_state(&self) -> DVector<f64> {
        self.boundaries().rest_state(self.boundaries().yb[0])
    }

    /// Diagnostics raised while constructing the planner.
    fn warnings(&self) -> &[PlannerWarning] {
        &[]
    }

    /// Evaluate the planned trajectory and its derivatives `0..=d` at `t`.
    fn eval(&self, t: f64) -> Result<DVector<f64>, PlannerError> {
        let b = self.boundaries();

        if t.is_nan() {
            return Err(PlannerError::InvalidTime(t));
        }

        if t < b.t0 {
            Ok(b.rest_state(b.ya[0]))
        } else if t > b.tf {
            Ok(b.rest_state(b.yb[0]))
        } else if t == b.t0 {
            Ok(self.start_state())
        } else if t == b.tf {
            Ok(self.end_state())
        } else {
            let y = self.eval_interior(t)?;

            if y.iter().all(|v| v.is_finite()) {
                Ok(y)
            } else {
                Err(PlannerError::NumericOverflow { t })
            }
        }
    }

    /// Sample the planned trajectory.
    ///
    /// Row `k` of the returned matrix is `eval(times[k])`.
    fn eval_vec(&self, times: &[f64]) -> Result<DMatrix<f64>, PlannerError> {
        let mut samples = DMatrix::zeros(times.len(), self.boundaries().order() + 1);

        for (k, t) in times.iter().enumerate() {
            samples.set_row(k, &self.eval(*t)?.transpose());
        }

        Ok(samples)
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Boundaries {
    /// Validate and create a new set of boundary conditions.
    ///
    /// `ya` and `yb` must both contain `d + 1` elements and `t0` must be
    /// strictly less than `tf`.
    pub fn new(
        ya: Vec<f64>,
        yb: Vec<f64>,
        t0: f64,
        tf: f64,
        d: usize,
    ) -> Result<Self, PlannerError> {
        if ya.len() != d + 1 || yb.len() != d + 1 {
            return Err(PlannerError::BoundaryLength {
                expected: d + 1,
                ya: ya.len(),
                yb: yb.len(),
            });
        }

        if !(t0.is_finite() && tf.is_finite() && t0 < tf) {
            return Err(PlannerError::DegenerateInterval { t0, tf });
        }

        Ok(Self {
            ya: DVector::from_vec(ya),
            yb: DVector::from_vec(yb),
            t0,
            tf,
            d,
        })
    }

    /// The start state.
    pub fn ya(&self) -> &DVector<f64> {
        &self.ya
    }

    /// The final state.
    pub fn yb(&self) -> &DVector<f64> {
        &self.yb
    }

    /// The start time.
    pub fn t0(&self) -> f64 {
        self.t0
    }

    /// The final time.
    pub fn tf(&self) -> f64 {
        self.tf
    }

    /// The smoothness order `d`.
    pub fn order(&self) -> usize {
        self.d
    }

    /// Length of the planning interval, `tf - t0`.
    pub fn duration(&self) -> f64 {
        self.tf - self.t0
    }

    /// Normalised time `τ = (t - t0) / (tf - t0)`.
    pub fn normalise(&self, t: f64) -> f64 {
        util::maths::lin_map((self.t0, self.tf), (0.0, 1.0), t)
    }

    /// `true` if any boundary derivative (order 1 and above) is non-zero.
    pub fn has_derivatives(&self) -> bool {
        self.ya.iter().skip(1).any(|v| *v != 0.0) || self.yb.iter().skip(1).any(|v| *v != 0.0)
    }

    /// Apply the boundary policy of a planner which only interpolates the
    /// boundary values.
    ///
    /// Returns the warnings which should be recorded on the planner.
    pub fn check_value_only(
        &self,
        planner: &'static str,
        policy: BoundaryPolicy,
    ) -> Result<Vec<PlannerWarning>, PlannerError> {
        if !self.has_derivatives() {
            return Ok(Vec::new());
        }

        match policy {
            BoundaryPolicy::Strict => Err(PlannerError::Configuration(format!(
                "the {} planner only supports zero boundary derivatives",
                planner
            ))),
            BoundaryPolicy::Relaxed => {
                let warning = PlannerWarning::IgnoredBoundaryDerivatives {
                    planner,
                    ya: self.ya.iter().copied().collect(),
                    yb: self.yb.iter().copied().collect(),
                };
                warn!("{}", warning);
                Ok(vec![warning])
            }
        }
    }

    /// Blend the boundary values using a transition function `phi` and its
    /// derivatives with respect to normalised time.
    ///
    /// The `i`-th time derivative is scaled by `(1 / (tf - t0))^i`.
    pub fn blend(&self, phi: &DVector<f64>) -> DVector<f64> {
        let delta = self.yb[0] - self.ya[0];
        let inv_duration = 1.0 / self.duration();

        DVector::from_fn(self.d + 1, |i, _| {
            if i == 0 {
                self.ya[0] + delta * phi[0]
            } else {
                inv_duration.powi(i as i32) * delta * phi[i]
            }
        })
    }

    /// A state resting at `value`, i.e. all derivatives are zero.
    pub fn rest_state(&self, value: f64) -> DVector<f64> {
        let mut state = DVector::zeros(self.d + 1);
        state[0] = value;
        state
    }
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::Relaxed
    }
}

impl fmt::Display for PlannerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerWarning::IgnoredBoundaryDerivatives { planner, ya, yb } => write!(
                f,
                "The {} planner ignores boundary derivatives, they are set to 0 \
                 (given YA = {:?}, YB = {:?})",
                planner, ya, yb
            ),
        }
    }
}
