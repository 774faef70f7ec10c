/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```
/// let value = 0.5;
/// deepq::assert_interval!(value, 0.0, 1.0);
/// ```
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}

/// Index of the largest value, favoring the first on ties
///
/// Returns `0` for an empty slice.
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (ix, &v)| {
            if v > max {
                (ix, v)
            } else {
                (best, max)
            }
        })
        .0
}

/// Largest value, or `0.0` for an empty slice
pub fn max(values: &[f32]) -> f32 {
    values.iter().copied().reduce(f32::max).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, -1.0]), 1);
        assert_eq!(argmax(&[-3.0, -2.0]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn max_of_values() {
        assert_eq!(max(&[0.1, 0.7, -1.0]), 0.7);
        assert_eq!(max(&[]), 0.0);
    }
}
