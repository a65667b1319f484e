//! # Polynomial planner
//!
//! Fits a single polynomial of degree `2d + 1` whose value and first `d`
//! derivatives match `YA` at `t0` and `YB` at `tf`.
//!
//! The polynomial is written in the scaled monomial basis `c_i t^i / i!`, so
//! that the `j`-th derivative of the trajectory is `T(t) c` where
//!
//! ```text
//! T[j, i] = t^(i - j) / (i - j)!    for i >= j, otherwise 0
//! ```
//!
//! The polynomial is expressed in local time `t - t0`, so stacking `T(0)`
//! and `T(tf - t0)` gives a square system of size `2(d + 1)` which is solved
//! once at construction. Its conditioning only depends on the interval
//! length, not on where the interval lies.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::{DMatrix, DVector};

// Internal
use super::{Boundaries, Planner, PlannerError};
use util::maths::factorial;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planner interpolating the boundary states with a polynomial.
#[derive(Debug, Clone)]
pub struct PolynomialPlanner {
    bounds: Boundaries,

    /// Coefficients of the polynomial in the scaled monomial basis.
    coeffs: DVector<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PolynomialPlanner {
    /// Fit the polynomial to the boundary conditions.
    pub fn new(bounds: Boundaries) -> Result<Self, PlannerError> {
        let n = bounds.order() + 1;

        // Boundary vector [YA, YB]
        let y = DVector::from_iterator(
            2 * n,
            bounds.ya().iter().chain(bounds.yb().iter()).copied(),
        );

        // Stack T(0) over T(tf - t0)
        let t0_mat = Self::t_matrix(bounds.order(), 0.0);
        let tf_mat = Self::t_matrix(bounds.order(), bounds.duration());
        let system = DMatrix::from_fn(2 * n, 2 * n, |r, c| {
            if r < n {
                t0_mat[(r, c)]
            } else {
                tf_mat[(r - n, c)]
            }
        });

        let coeffs = system.lu().solve(&y).ok_or(PlannerError::SingularSystem)?;

        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(PlannerError::SingularSystem);
        }

        debug!(
            "Polynomial planner fitted on [{}, {}] with d = {}",
            bounds.t0(),
            bounds.tf(),
            bounds.order()
        );

        Ok(Self { bounds, coeffs })
    }

    /// The derivative evaluation matrix `T(t)` of shape `(d + 1) x (2d + 2)`.
    ///
    /// Row `j` evaluates the `j`-th derivative of the scaled monomial basis
    /// at `t`.
    pub fn t_matrix(d: usize, t: f64) -> DMatrix<f64> {
        let n = d + 1;
        let m = 2 * d + 2;

        DMatrix::from_fn(n, m, |j, i| {
            if i >= j {
                t.powi((i - j) as i32) / factorial::<f64>((i - j) as u32)
            } else {
                0.0
            }
        })
    }

    /// The fitted coefficients, in local time `t - t0`.
    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coeffs
    }
}

impl Planner for PolynomialPlanner {
    fn boundaries(&self) -> &Boundaries {
        &self.bounds
    }

    fn eval_interior(&self, t: f64) -> Result<DVector<f64>, PlannerError> {
        Ok(Self::t_matrix(self.bounds.order(), t - self.bounds.t0()) * &self.coeffs)
    }

    fn start_state(&self) -> DVector<f64> {
        self.bounds.ya().clone()
    }

    fn end_state(&self) -> DVector<f64> {
        self.bounds.yb().clone()
    }
}
