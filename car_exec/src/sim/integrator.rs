//! Numerical integration methods
//!
//! Runge-Kutta schemes for `dx/dt = f(t, x)` where evaluating `f` may fail.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::SVector;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Single step of the classic 4th order Runge-Kutta method.
///
/// # Arguments
/// * `x` - Current state
/// * `t` - Current time
/// * `dt` - Time step
/// * `f` - Derivative function f(t, x) -> dx/dt
pub fn rk4<const N: usize, F, E>(
    x: &SVector<f64, N>,
    t: f64,
    dt: f64,
    f: &mut F,
) -> Result<SVector<f64, N>, E>
where
    F: FnMut(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, E>,
{
    let k1 = f(t, x)?;
    let k2 = f(t + dt / 2.0, &(x + k1 * dt / 2.0))?;
    let k3 = f(t + dt / 2.0, &(x + k2 * dt / 2.0))?;
    let k4 = f(t + dt, &(x + k3 * dt))?;

    Ok(x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
}

/// Single Runge-Kutta-Fehlberg 4(5) step.
///
/// Returns the 5th order solution and the norm of the difference to the
/// embedded 4th order solution, which estimates the local error.
pub fn rkf45<const N: usize, F, E>(
    x: &SVector<f64, N>,
    t: f64,
    dt: f64,
    f: &mut F,
) -> Result<(SVector<f64, N>, f64), E>
where
    F: FnMut(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, E>,
{
    // Fehlberg coefficients
    let k1 = f(t, x)?;
    let k2 = f(t + dt / 4.0, &(x + k1 * dt / 4.0))?;
    let k3 = f(
        t + 3.0 * dt / 8.0,
        &(x + k1 * (3.0 * dt / 32.0) + k2 * (9.0 * dt / 32.0)),
    )?;
    let k4 = f(
        t + 12.0 * dt / 13.0,
        &(x + k1 * (1932.0 * dt / 2197.0) - k2 * (7200.0 * dt / 2197.0)
            + k3 * (7296.0 * dt / 2197.0)),
    )?;
    let k5 = f(
        t + dt,
        &(x + k1 * (439.0 * dt / 216.0) - k2 * (8.0 * dt) + k3 * (3680.0 * dt / 513.0)
            - k4 * (845.0 * dt / 4104.0)),
    )?;
    let k6 = f(
        t + dt / 2.0,
        &(x - k1 * (8.0 * dt / 27.0) + k2 * (2.0 * dt) - k3 * (3544.0 * dt / 2565.0)
            + k4 * (1859.0 * dt / 4104.0)
            - k5 * (11.0 * dt / 40.0)),
    )?;

    // 4th order solution
    let x4 = x + (k1 * (25.0 / 216.0) + k3 * (1408.0 / 2565.0) + k4 * (2197.0 / 4104.0)
        - k5 * (1.0 / 5.0))
        * dt;

    // 5th order solution
    let x5 = x + (k1 * (16.0 / 135.0) + k3 * (6656.0 / 12825.0) + k4 * (28561.0 / 56430.0)
        - k5 * (9.0 / 50.0)
        + k6 * (2.0 / 55.0))
        * dt;

    Ok((x5, (x5 - x4).norm()))
}
