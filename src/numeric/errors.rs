// ============================================================================
// Calculation Errors
// Error types for chain construction and decimal arithmetic
// ============================================================================

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors that can occur while building or evaluating a calculation.
///
/// Every error is a formula-construction or arithmetic contract violation,
/// raised at the exact call where it is detected. None are transient: the
/// caller must fix the call sequence, not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CalcError {
    /// A binary floating-point operand (f32/f64) was supplied
    FloatOperand,
    /// A close-parenthesis call had no matching open scope
    UnmatchedCloseParen,
    /// One or more open scopes were still unresolved at result extraction
    UnclosedParen,
    /// An operator was applied before any value was set
    Uninitialized,
    /// Attempted division by zero
    DivisionByZero,
    /// An intermediate or final value exceeded the representable range
    Overflow,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::FloatOperand => write!(
                f,
                "floating-point operands are not supported: use an integer or Decimal"
            ),
            CalcError::UnmatchedCloseParen => {
                write!(f, "unmatched close parenthesis: no open scope to resolve")
            },
            CalcError::UnclosedParen => write!(
                f,
                "unclosed parenthesis: every open scope must be closed before reading the result"
            ),
            CalcError::Uninitialized => {
                write!(f, "no value set: supply a value before applying an operator")
            },
            CalcError::DivisionByZero => write!(f, "division by zero"),
            CalcError::Overflow => {
                write!(f, "arithmetic overflow: value exceeds the representable range")
            },
        }
    }
}

impl std::error::Error for CalcError {}

/// Result type alias for calculator operations
pub type CalcResult<T> = Result<T, CalcError>;
