//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Wrap an angle in degrees into the half-open range (-180, 180].
///
/// Exactly -180 maps to +180, so that there is a single representation of the "pointing
/// backwards" heading.
pub fn wrap_180_deg<T>(angle_deg: T) -> T
where
    T: Float
{
    let half_turn = T::from(180.0).unwrap_or_else(T::zero);
    let full_turn = half_turn + half_turn;

    // (180 - a) mod 360 lies in [0, 360), so the result lies in (-180, 180]
    let wrapped = half_turn - rem_euclid(half_turn - angle_deg, full_turn);

    // Round-off in rem_euclid can return exactly 360
    if wrapped <= -half_turn {
        wrapped + full_turn
    }
    else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, if `lhs` is much smaller than `rhs.abs()` in 
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_180_deg() {
        assert_eq!(wrap_180_deg(0f32), 0.0);
        assert_eq!(wrap_180_deg(90f32), 90.0);
        assert_eq!(wrap_180_deg(180f32), 180.0);
        assert_eq!(wrap_180_deg(-180f32), 180.0);
        assert_eq!(wrap_180_deg(190f32), -170.0);
        assert_eq!(wrap_180_deg(-190f32), 170.0);
        assert_eq!(wrap_180_deg(540f32), 180.0);
        assert_eq!(wrap_180_deg(-721f64), -1.0);
    }

    #[test]
    fn test_wrap_180_deg_range() {
        let mut angle = 0f32;
        for _ in 0..10_000 {
            angle = wrap_180_deg(angle - 7.3);
            assert!(angle > -180.0 && angle <= 180.0, "angle {} out of range", angle);
        }

        for small in &[-1e-7f32, 1e-7, -1e-30, 1e-30] {
            let w = wrap_180_deg(*small);
            assert!(w > -180.0 && w <= 180.0);
        }
    }
}
