// ============================================================================
// Numeric Module
// Input coercion and error types for exact decimal arithmetic
// ============================================================================
//
// This module provides:
// - ToDecimal: coercion of heterogeneous numeric inputs into Decimal
// - CalcError/CalcResult: error types for chain construction and arithmetic
// - round_half_up/divide_half_up: shared HALF-UP rounding helpers
//
// Design principles:
// - No binary floating-point value ever enters a computation
// - All fallible operations return Result (no panics)
// - Rounding happens only where a target scale is explicitly requested

mod coerce;
mod errors;

pub use coerce::{divide_half_up, round_half_up, ToDecimal};
pub use errors::{CalcError, CalcResult};
