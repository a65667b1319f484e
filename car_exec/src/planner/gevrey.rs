//! # Gevrey planner
//!
//! Blends the boundary values through a Gevrey class transition function
//!
//! ```text
//! y(τ)   = tanh( 2(2τ - 1) / (4τ(1 - τ))^s )
//! phi(τ) = (1 + y(τ)) / 2
//! ```
//!
//! The parameter `s > 1` tunes the transition, larger values give steeper
//! transitions with smaller derivatives near the boundaries.
//!
//! The derivatives of `y` are given by three coupled sequences. `a(n)` is the
//! `(n - 1)`-th derivative of the tanh argument, `z = 1 - y^2`:
//!
//! ```text
//! a(0) = (4τ(1-τ))^(1-s) / (2(s-1))
//! a(1) = 2(2τ-1) / (4τ(1-τ))^s
//! a(n) = [ (s-2+n)(2τ-1) a(n-1) + (n-1)(2s-4+n) a(n-2) ] / (τ(1-τ))
//!
//! y(0) = tanh(a(1))
//! y(n) = Σ_{k=0}^{n-1} binom(n-1, k) a(k+2) z(n-1-k)
//!
//! z(0) = 1 - y(0)^2
//! z(n) = -Σ_{k=0}^{n} binom(n, k) y(k) y(n-k)
//! ```
//!
//! `y(n)` only needs `z` up to order `n - 1` and `z(n)` only needs `y` up to
//! order `n`, so all three are filled bottom-up in a single pass.
//!
//! Reference: J. Rudolph, J. Winkler, F. Woittennek, "Flatness Based Control
//! of Distributed Parameter Systems", Appendix A.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::DVector;

// Internal
use super::{Boundaries, BoundaryPolicy, Planner, PlannerError, PlannerWarning};
use util::maths::{binomial, clamp};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Interior points are clamped into `[TAU_CLAMP, 1 - TAU_CLAMP]` to stay
/// clear of the singularity of `(4τ(1-τ))^s` at the boundaries.
pub const TAU_CLAMP: f64 = 0.001;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planner blending the boundary values with a Gevrey class function.
#[derive(Debug, Clone)]
pub struct GevreyPlanner {
    bounds: Boundaries,

    /// Gevrey order, must be greater than 1.
    s: f64,

    warnings: Vec<PlannerWarning>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GevreyPlanner {
    /// Create a new Gevrey planner with order `s`.
    ///
    /// Fails with [`PlannerError::InvalidParameter`] unless `s > 1`. Only
    /// `YA[0]` and `YB[0]` are interpolated, see [`BoundaryPolicy`] for how
    /// non-zero boundary derivatives are handled.
    pub fn new(bounds: Boundaries, s: f64, policy: BoundaryPolicy) -> Result<Self, PlannerError> {
        if !(s.is_finite() && s > 1.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "the Gevrey order s must be a finite number greater than 1, found {}",
                s
            )));
        }

        let warnings = bounds.check_value_only("gevrey", policy)?;

        debug!(
            "Gevrey planner created on [{}, {}] with d = {}, s = {}",
            bounds.t0(),
            bounds.tf(),
            bounds.order(),
            s
        );

        Ok(Self {
            bounds,
            s,
            warnings,
        })
    }

    /// The Gevrey order `s`.
    pub fn s(&self) -> f64 {
        self.s
    }

    /// The transition function `phi` and its derivatives `0..=d` at
    /// normalised time `tau`.
    ///
    /// `tau` is clamped into `[TAU_CLAMP, 1 - TAU_CLAMP]`.
    pub fn phi(&self, tau: f64) -> DVector<f64> {
        let tau = clamp(tau, TAU_CLAMP, 1.0 - TAU_CLAMP);
        let (_, y, _) = self.sequences(tau);

        DVector::from_fn(self.bounds.order() + 1, |i, _| {
            if i == 0 {
                0.5 * (1.0 + y[0])
            } else {
                0.5 * y[i]
            }
        })
    }

    /// Fill the `a`, `y` and `z` sequences up to the smoothness order.
    fn sequences(&self, tau: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let d = self.bounds.order();
        let s = self.s;

        let w = 4.0 * tau * (1.0 - tau);
        let c = 2.0 * tau - 1.0;

        // a is needed up to order d + 1
        let mut a = Vec::with_capacity(d + 2);
        a.push(w.powf(1.0 - s) / (2.0 * (s - 1.0)));
        a.push(2.0 * c / w.powf(s));
        for n in 2..=(d + 1) {
            let nf = n as f64;
            a.push(
                ((s - 2.0 + nf) * c * a[n - 1] + (nf - 1.0) * (2.0 * s - 4.0 + nf) * a[n - 2])
                    / (tau * (1.0 - tau)),
            );
        }

        let mut y = Vec::with_capacity(d + 1);
        let mut z = Vec::with_capacity(d + 1);

        y.push(a[1].tanh());
        z.push(1.0 - y[0] * y[0]);

        for n in 1..=d {
            let y_n: f64 = (0..n)
                .map(|k| binomial::<f64>((n - 1) as u32, k as u32) * a[k + 2] * z[n - 1 - k])
                .sum();
            y.push(y_n);

            let z_n: f64 = (0..=n)
                .map(|k| binomial::<f64>(n as u32, k as u32) * y[k] * y[n - k])
                .sum();
            z.push(-z_n);
        }

        (a, y, z)
    }
}

impl Planner for GevreyPlanner {
    fn boundaries(&self) -> &Boundaries {
        &self.bounds
    }

    fn eval_interior(&self, t: f64) -> Result<DVector<f64>, PlannerError> {
        let phi = self.phi(self.bounds.normalise(t));
        Ok(self.bounds.blend(&phi))
    }

    fn warnings(&self) -> &[PlannerWarning] {
        &self.warnings
    }
}
