//! Pure predicate and transform rules shared by every stage.

/// Squares at or above this value are dropped by the square stage.
pub const SQUARE_THRESHOLD: i64 = 100_000;

/// True when `value` is evenly divisible by two. Holds for negatives and zero.
#[inline]
pub fn is_even(value: i64) -> bool {
    value % 2 == 0
}

/// Square computed in 128 bits; cannot overflow for any `i64` input.
#[inline]
pub fn square(value: i64) -> i128 {
    let wide = i128::from(value);
    wide * wide
}

/// True when `square` is strictly below `threshold`.
#[inline]
pub fn below_threshold(square: i128, threshold: i64) -> bool {
    square < i128::from(threshold)
}

/// Square `value` and keep it only if it stays below `threshold`.
pub fn square_below(value: i64, threshold: i64) -> Option<i64> {
    let sq = square(value);
    if below_threshold(sq, threshold) {
        i64::try_from(sq).ok()
    } else {
        None
    }
}
