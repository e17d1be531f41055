// ============================================================================
// Convenience Operations
// Direct arithmetic calls with no scoping semantics
// ============================================================================
//
// Plain one-shot wrappers for callers who do not need a chain. Results are
// canonicalized through the shared pool, same as chain results.

use crate::numeric::{divide_half_up, round_half_up, CalcError, CalcResult, ToDecimal};
use crate::pool::shared_pool;
use rust_decimal::Decimal;

/// `a + b`
pub fn add(a: impl ToDecimal, b: impl ToDecimal) -> CalcResult<Decimal> {
    let sum = a
        .to_decimal()?
        .checked_add(b.to_decimal()?)
        .ok_or(CalcError::Overflow)?;
    Ok(shared_pool().get(sum))
}

/// `a - b`
pub fn subtract(a: impl ToDecimal, b: impl ToDecimal) -> CalcResult<Decimal> {
    let difference = a
        .to_decimal()?
        .checked_sub(b.to_decimal()?)
        .ok_or(CalcError::Overflow)?;
    Ok(shared_pool().get(difference))
}

/// `a * b`
pub fn multiply(a: impl ToDecimal, b: impl ToDecimal) -> CalcResult<Decimal> {
    let product = a
        .to_decimal()?
        .checked_mul(b.to_decimal()?)
        .ok_or(CalcError::Overflow)?;
    Ok(shared_pool().get(product))
}

/// `a / b`, rounded HALF-UP to `scale` fractional digits.
pub fn divide(a: impl ToDecimal, b: impl ToDecimal, scale: u32) -> CalcResult<Decimal> {
    let quotient = divide_half_up(a.to_decimal()?, b.to_decimal()?, scale)?;
    Ok(shared_pool().get(quotient))
}

/// `-a`
pub fn negate(a: impl ToDecimal) -> CalcResult<Decimal> {
    Ok(shared_pool().get(-a.to_decimal()?))
}

/// `|a|`
pub fn abs(a: impl ToDecimal) -> CalcResult<Decimal> {
    Ok(shared_pool().get(a.to_decimal()?.abs()))
}

/// `a` rounded HALF-UP to `scale` fractional digits.
pub fn round(a: impl ToDecimal, scale: u32) -> CalcResult<Decimal> {
    Ok(shared_pool().get(round_half_up(a.to_decimal()?, scale)))
}

/// Sum of all values; zero for an empty iterator.
pub fn sum<I>(values: I) -> CalcResult<Decimal>
where
    I: IntoIterator,
    I::Item: ToDecimal,
{
    let mut acc = Decimal::ZERO;
    for value in values {
        acc = acc
            .checked_add(value.to_decimal()?)
            .ok_or(CalcError::Overflow)?;
    }
    Ok(shared_pool().get(acc))
}

/// Product of all values; one for an empty iterator.
pub fn product<I>(values: I) -> CalcResult<Decimal>
where
    I: IntoIterator,
    I::Item: ToDecimal,
{
    let mut acc = Decimal::ONE;
    for value in values {
        acc = acc
            .checked_mul(value.to_decimal()?)
            .ok_or(CalcError::Overflow)?;
    }
    Ok(shared_pool().get(acc))
}
