/// Largest `n` for which `n!` is finite as an `f64`.
pub const MAX_FACTORIAL: u32 = 170;

/// Returns `true` if `value` is finite and has no fractional part.
#[must_use]
pub fn is_whole(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

/// Converts a non-negative whole number to `u8`, saturating at `u8::MAX`.
///
/// Returns `None` for negative, fractional or non-finite input.
///
/// # Example
/// ```
/// use opera::util::num::whole_to_u8;
///
/// assert_eq!(whole_to_u8(7.0), Some(7));
/// assert_eq!(whole_to_u8(900.0), Some(255));
/// assert_eq!(whole_to_u8(2.5), None);
/// assert_eq!(whole_to_u8(-1.0), None);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_to_u8(value: f64) -> Option<u8> {
    if !is_whole(value) || value < 0.0 {
        return None;
    }
    Some(value.min(f64::from(u8::MAX)) as u8)
}

/// Computes `n!` for a non-negative whole number.
///
/// ## Returns
/// - `Some(f64)`: the factorial, exact up to `22!` and correctly rounded
///   beyond.
/// - `None`: if `n` is negative, fractional, or so large that the result is
///   not finite.
///
/// ## Example
/// ```
/// use opera::util::num::factorial;
///
/// assert_eq!(factorial(0.0), Some(1.0));
/// assert_eq!(factorial(5.0), Some(120.0));
/// assert_eq!(factorial(-1.0), None);
/// assert_eq!(factorial(1.5), None);
/// assert_eq!(factorial(171.0), None);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn factorial(n: f64) -> Option<f64> {
    if !is_whole(n) || n < 0.0 || n > f64::from(MAX_FACTORIAL) {
        return None;
    }
    let n = n as u32;
    Some((2..=n).map(f64::from).product())
}
