//! # Simulation module
//!
//! Integrates a [`Model`] over a fixed grid of sample times. The state is
//! reported at every sample, between samples the integrator either takes a
//! single RK4 step or adaptively sub-steps with RKF45.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod integrator;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

// Internal
use crate::model::{Model, ModelError};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a simulation run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimParams {
    /// Start time
    ///
    /// Units: seconds
    pub t0: f64,

    /// Final time
    ///
    /// Units: seconds
    pub tf: f64,

    /// Sample period
    ///
    /// Units: seconds
    pub dt: f64,

    /// Initial state
    pub x0: Vec<f64>,

    /// Integration method
    #[serde(default)]
    pub method: Method,

    /// Local error tolerance of the adaptive method
    #[serde(default = "default_tol")]
    pub tol: f64,

    /// Smallest step the adaptive method may take before giving up
    #[serde(default = "default_min_step")]
    pub min_step: f64,
}

/// A simulation over a fixed grid of sample times.
#[derive(Debug, Clone)]
pub struct Simulation<const N: usize> {
    params: SimParams,

    x0: SVector<f64, N>,
}

/// Result of a simulation, one state per sample time.
#[derive(Debug, Clone)]
pub struct SimOutput<const N: usize> {
    pub t: Vec<f64>,

    pub x: Vec<SVector<f64, N>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Available integration methods.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// One classic Runge-Kutta step per sample period
    Rk4,

    /// Adaptive Runge-Kutta-Fehlberg 4(5)
    Rkf45,
}

/// Errors which can occur during simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid simulation parameters: {0}")]
    InvalidParams(String),

    #[error("Model evaluation failed: {0}")]
    Model(#[from] ModelError),

    #[error("The adaptive step size fell below the minimum at t = {t} (local error {error})")]
    StepSizeUnderflow { t: f64, error: f64 },

    #[error("The state is no longer finite at t = {t}")]
    NonFiniteState { t: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Method {
    fn default() -> Self {
        Method::Rkf45
    }
}

impl<const N: usize> Simulation<N> {
    /// Validate the parameters and create a new simulation.
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        if !(params.t0.is_finite() && params.tf.is_finite() && params.t0 < params.tf) {
            return Err(SimError::InvalidParams(format!(
                "expected t0 < tf, found t0 = {} and tf = {}",
                params.t0, params.tf
            )));
        }
        if !(params.dt.is_finite() && params.dt > 0.0) {
            return Err(SimError::InvalidParams(format!(
                "the sample period must be positive, found {}",
                params.dt
            )));
        }
        if !(params.tol > 0.0 && params.min_step > 0.0) {
            return Err(SimError::InvalidParams(
                "the tolerance and minimum step must be positive".into(),
            ));
        }
        if params.x0.len() != N {
            return Err(SimError::InvalidParams(format!(
                "expected an initial state with {} elements, found {}",
                N,
                params.x0.len()
            )));
        }

        let x0 = SVector::<f64, N>::from_column_slice(&params.x0);

        Ok(Self { params, x0 })
    }

    /// The sample times `t0, t0 + dt, ...` up to and including `tf`.
    pub fn time_vector(&self) -> Vec<f64> {
        let p = &self.params;
        let num_steps = ((p.tf - p.t0) / p.dt + 0.5).floor() as usize;

        (0..=num_steps).map(|k| p.t0 + k as f64 * p.dt).collect()
    }

    /// Integrate the model from the initial state over all sample times.
    pub fn simulate<M: Model<N>>(&self, model: &M) -> Result<SimOutput<N>, SimError> {
        let t = self.time_vector();
        let mut x = Vec::with_capacity(t.len());
        x.push(self.x0);

        debug!(
            "Simulating {} samples from t = {} to t = {} using {:?}",
            t.len(),
            self.params.t0,
            self.params.tf,
            self.params.method
        );

        let mut f = |t: f64, x: &SVector<f64, N>| model.ode(t, x);

        let mut h = self.params.dt;
        for window in t.windows(2) {
            let x_prev = x[x.len() - 1];

            let x_next = match self.params.method {
                Method::Rk4 => integrator::rk4(&x_prev, window[0], window[1] - window[0], &mut f)?,
                Method::Rkf45 => {
                    let (x_next, h_next) =
                        self.adaptive_interval(&x_prev, window[0], window[1], h, &mut f)?;
                    h = h_next;
                    x_next
                }
            };

            if !x_next.iter().all(|v| v.is_finite()) {
                return Err(SimError::NonFiniteState { t: window[1] });
            }

            x.push(x_next);
        }

        Ok(SimOutput { t, x })
    }

    /// Integrate from `t_start` to `t_end` with adaptive RKF45 steps.
    ///
    /// Returns the state at `t_end` and the suggested next step size.
    fn adaptive_interval<F>(
        &self,
        x: &SVector<f64, N>,
        t_start: f64,
        t_end: f64,
        h_init: f64,
        f: &mut F,
    ) -> Result<(SVector<f64, N>, f64), SimError>
    where
        F: FnMut(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, ModelError>,
    {
        let tol = self.params.tol;
        let min_step = self.params.min_step;

        let mut x = *x;
        let mut t = t_start;
        let mut h = h_init;

        while t < t_end {
            let remaining = t_end - t;
            let last = h >= remaining;
            let step = if last { remaining } else { h };

            let (x_new, error) = integrator::rkf45(&x, t, step, f)?;

            // A diverged state gives no usable error estimate
            if !error.is_finite() {
                return Err(SimError::NonFiniteState { t });
            }

            // Standard step size update for a 4th order error estimate
            let factor = if error > 0.0 {
                clamp(0.84 * (tol / error).powf(0.25), 0.1, 4.0)
            } else {
                4.0
            };

            if error <= tol {
                x = x_new;
                t = if last { t_end } else { t + step };

                // Don't let a shortened final step shrink the next interval
                h = (step * factor).max(h.min(step * 4.0));
            } else {
                h = step * factor;
                trace!("Rejected step at t = {} (error {}), retrying with {}", t, error, h);

                if h < min_step {
                    return Err(SimError::StepSizeUnderflow { t, error });
                }
            }
        }

        Ok((x, h))
    }
}

impl<const N: usize> SimOutput<N> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// `true` if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_tol() -> f64 {
    1e-6
}

fn default_min_step() -> f64 {
    1e-9
}
