//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value into the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// The factorial `n!` as a float.
///
/// Computed in floating point so that moderately large `n` do not overflow
/// an integer type before the caller divides them away.
pub fn factorial<T>(n: u32) -> T
where
    T: Float
{
    let mut res = T::one();

    for i in 2..=n {
        res = res * T::from(i).unwrap_or_else(T::nan);
    }

    res
}

/// The falling factorial `x (x - 1) ... (x - k + 1)`, i.e. the product of `k`
/// terms counting down from `x`. The empty product (`k = 0`) is one.
pub fn falling_factorial<T>(x: T, k: u32) -> T
where
    T: Float
{
    let mut res = T::one();
    let mut term = x;

    for _ in 0..k {
        res = res * term;
        term = term - T::one();
    }

    res
}

/// The binomial coefficient `n choose k`, zero if `k > n`.
pub fn binomial<T>(n: u32, k: u32) -> T
where
    T: Float
{
    if k > n {
        return T::zero();
    }

    // Use the symmetric form with fewer terms
    let k = k.min(n - k);

    let mut res = T::one();
    for i in 0..k {
        res = res * T::from(n - i).unwrap_or_else(T::nan)
            / T::from(i + 1).unwrap_or_else(T::nan);
    }

    res.round()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 2.0), (0.0, 1.0), 1.0), 0.5);
        assert_eq!(lin_map((1.0, 3.0), (0.0, 1.0), 3.0), 1.0);
        assert_eq!(lin_map((1.0, 3.0), (-1.0, 1.0), 1.0), -1.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.5, 0.001, 0.999), 0.5);
        assert_eq!(clamp(0.0, 0.001, 0.999), 0.001);
        assert_eq!(clamp(1.0, 0.001, 0.999), 0.999);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial::<f64>(0), 1.0);
        assert_eq!(factorial::<f64>(1), 1.0);
        assert_eq!(factorial::<f64>(5), 120.0);
        assert_eq!(factorial::<f64>(10), 3628800.0);
    }

    #[test]
    fn test_falling_factorial() {
        assert_eq!(falling_factorial(5.0, 0), 1.0);
        assert_eq!(falling_factorial(5.0, 1), 5.0);
        assert_eq!(falling_factorial(5.0, 3), 60.0);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial::<f64>(0, 0), 1.0);
        assert_eq!(binomial::<f64>(4, 2), 6.0);
        assert_eq!(binomial::<f64>(5, 0), 1.0);
        assert_eq!(binomial::<f64>(5, 5), 1.0);
        assert_eq!(binomial::<f64>(10, 3), 120.0);
        assert_eq!(binomial::<f64>(3, 4), 0.0);
    }
}
