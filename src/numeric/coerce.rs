// ============================================================================
// Numeric Coercion
// Converts heterogeneous numeric inputs into the canonical Decimal type
// ============================================================================

use super::errors::{CalcError, CalcResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Conversion into the canonical arbitrary-precision decimal type.
///
/// Implemented for all integer primitives (exact by value) and for
/// [`Decimal`] itself. Binary floating-point types implement the trait but
/// always fail with [`CalcError::FloatOperand`]: an f64 literal like `0.1`
/// has no exact decimal representation, and accepting it would let the
/// precision loss poison every downstream computation.
///
/// # Example
/// ```
/// use fluent_calc::numeric::ToDecimal;
///
/// assert!(42i64.to_decimal().is_ok());
/// assert!(0.1f64.to_decimal().is_err());
/// ```
pub trait ToDecimal {
    /// Convert to a [`Decimal`], or fail for rejected input types.
    fn to_decimal(&self) -> CalcResult<Decimal>;
}

impl ToDecimal for Decimal {
    #[inline]
    fn to_decimal(&self) -> CalcResult<Decimal> {
        Ok(*self)
    }
}

impl ToDecimal for &Decimal {
    #[inline]
    fn to_decimal(&self) -> CalcResult<Decimal> {
        Ok(**self)
    }
}

macro_rules! impl_integer_coercion {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToDecimal for $t {
                #[inline]
                fn to_decimal(&self) -> CalcResult<Decimal> {
                    Ok(Decimal::from(*self))
                }
            }
        )*
    };
}

impl_integer_coercion!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

macro_rules! impl_float_rejection {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToDecimal for $t {
                #[inline]
                fn to_decimal(&self) -> CalcResult<Decimal> {
                    Err(CalcError::FloatOperand)
                }
            }
        )*
    };
}

impl_float_rejection!(f32, f64);

/// Round to `scale` fractional digits using HALF-UP (midpoint away from
/// zero), then pad trailing zeros back out to exactly `scale` digits.
///
/// Matches fixed-scale rounding semantics: `round(3.999, 2)` is `4.00`,
/// not `4`.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    if rounded.scale() < scale {
        rounded.rescale(scale);
    }
    rounded
}

/// Exact division followed by HALF-UP rounding at the requested scale.
///
/// # Errors
/// Returns `DivisionByZero` when `divisor` is zero, `Overflow` when the
/// quotient exceeds the representable range.
pub fn divide_half_up(dividend: Decimal, divisor: Decimal, scale: u32) -> CalcResult<Decimal> {
    if divisor.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    let quotient = dividend.checked_div(divisor).ok_or(CalcError::Overflow)?;
    Ok(round_half_up(quotient, scale))
}
