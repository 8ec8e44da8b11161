//! WAD fixed-point arithmetic helpers.
//!
//! All quantities in the engine (token amounts, prices, rates, indices,
//! risk factors) are scaled by [`WAD`] (1e18). Division helpers are total:
//! a zero denominator yields `U256::ZERO` instead of panicking, which keeps
//! every caller on the `Result` path for domain errors only.

use alloy_primitives::U256;

/// The WAD fixed-point unit (1e18)
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Seconds in a (non-leap) year, used to convert annualized rates
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Rounding direction for share/asset style conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingDirection {
    /// Round towards zero
    Down,
    /// Round away from zero
    Up,
}

/// Returns `x * y / d`, rounding down. Zero if `d` is zero.
pub fn mul_div_down(x: U256, y: U256, d: U256) -> U256 {
    if d.is_zero() {
        return U256::ZERO;
    }
    x * y / d
}

/// Returns `x * y / d`, rounding up. Zero if `d` is zero.
pub fn mul_div_up(x: U256, y: U256, d: U256) -> U256 {
    if d.is_zero() {
        return U256::ZERO;
    }
    let numerator = x * y;
    if numerator.is_zero() {
        return U256::ZERO;
    }
    (numerator - U256::from(1)) / d + U256::from(1)
}

/// Returns `x * y / d` with the given rounding direction
pub fn mul_div(x: U256, y: U256, d: U256, rounding: RoundingDirection) -> U256 {
    match rounding {
        RoundingDirection::Down => mul_div_down(x, y, d),
        RoundingDirection::Up => mul_div_up(x, y, d),
    }
}

/// WAD-multiply, rounding down: `x * y / WAD`
pub fn w_mul_down(x: U256, y: U256) -> U256 {
    mul_div_down(x, y, WAD)
}

/// WAD-multiply, rounding up
pub fn w_mul_up(x: U256, y: U256) -> U256 {
    mul_div_up(x, y, WAD)
}

/// WAD-divide, rounding down: `x * WAD / y`
pub fn w_div_down(x: U256, y: U256) -> U256 {
    mul_div_down(x, WAD, y)
}

/// WAD-divide, rounding up
pub fn w_div_up(x: U256, y: U256) -> U256 {
    mul_div_up(x, WAD, y)
}

/// Returns `x - y`, floored at zero
pub fn zero_floor_sub(x: U256, y: U256) -> U256 {
    x.saturating_sub(y)
}

/// Returns the smaller of the two values
pub fn min(x: U256, y: U256) -> U256 {
    if x < y {
        x
    } else {
        y
    }
}

/// Returns the larger of the two values
pub fn max(x: U256, y: U256) -> U256 {
    if x > y {
        x
    } else {
        y
    }
}

/// Converts a WAD-scaled value to `f64`, saturating at `u128::MAX`.
///
/// Lossy; intended for assertions and display, never for accounting.
pub fn rate_to_f64(x: U256) -> f64 {
    let v: u128 = x.saturating_to();
    v as f64 / 1e18
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        // 10 * 10 / 3 = 33.33..
        let down = mul_div_down(U256::from(10), U256::from(10), U256::from(3));
        let up = mul_div_up(U256::from(10), U256::from(10), U256::from(3));
        assert_eq!(down, U256::from(33));
        assert_eq!(up, U256::from(34));
    }

    #[test]
    fn test_mul_div_exact() {
        // Exact division: both directions agree
        let down = mul_div_down(U256::from(10), U256::from(9), U256::from(3));
        let up = mul_div_up(U256::from(10), U256::from(9), U256::from(3));
        assert_eq!(down, U256::from(30));
        assert_eq!(up, U256::from(30));
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(mul_div_down(WAD, WAD, U256::ZERO), U256::ZERO);
        assert_eq!(mul_div_up(WAD, WAD, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_w_mul_w_div() {
        let half = WAD / U256::from(2);
        assert_eq!(w_mul_down(WAD, half), half);
        assert_eq!(w_div_down(half, WAD), half);
        assert_eq!(w_div_down(half, half), WAD);
    }

    #[test]
    fn test_w_mul_up_rounds() {
        // 1 wei * 0.5 rounds up to 1 wei
        let half = WAD / U256::from(2);
        assert_eq!(w_mul_down(U256::from(1), half), U256::ZERO);
        assert_eq!(w_mul_up(U256::from(1), half), U256::from(1));
    }

    #[test]
    fn test_zero_floor_sub() {
        assert_eq!(zero_floor_sub(U256::from(5), U256::from(3)), U256::from(2));
        assert_eq!(zero_floor_sub(U256::from(3), U256::from(5)), U256::ZERO);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min(WAD, U256::ZERO), U256::ZERO);
        assert_eq!(max(WAD, U256::ZERO), WAD);
    }

    #[test]
    fn test_rate_to_f64() {
        let f = rate_to_f64(WAD / U256::from(4));
        assert!((f - 0.25).abs() < 1e-12);
    }
}
