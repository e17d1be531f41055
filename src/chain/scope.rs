// ============================================================================
// Scope Frames
// One arithmetic scope of the explicit-bracket engine
// ============================================================================

use crate::numeric::{divide_half_up, round_half_up, CalcError, CalcResult};
use rust_decimal::Decimal;

/// Operator recorded on a scope when it opens a child, deferred until the
/// child scope closes. `Divide` and `Round` carry their target scale, so a
/// pending divide or round can never be resolved without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pending {
    /// Pure grouping: the child's value replaces this scope's value
    None,
    Add,
    Subtract,
    Multiply,
    Divide { scale: u32 },
    Round { scale: u32 },
    Negate,
    Abs,
}

/// One scope on the bracket-matching stack.
///
/// `value` is `None` only for a scope opened without an operand; a pending
/// operator other than `None` means a child scope is currently open and
/// must be resolved before any ancestor's result can be read.
#[derive(Debug)]
pub(crate) struct Frame {
    pub value: Option<Decimal>,
    pub pending: Pending,
}

impl Frame {
    pub fn new(value: Option<Decimal>) -> Self {
        Self {
            value,
            pending: Pending::None,
        }
    }

    /// Resolve this scope's pending operator against a closed child scope,
    /// then reset the pending state.
    ///
    /// For `Negate`/`Abs`/`Round` the child's transformed value replaces
    /// this scope's value outright: the parenthesis form expresses
    /// `op(child)`, not `parent op child`, so any prior value here is
    /// discarded. Binary operators require this scope's value to be set.
    pub fn resolve(&mut self, child: Decimal) -> CalcResult<()> {
        let combined = match self.pending {
            Pending::None => child,
            Pending::Add => self
                .require()?
                .checked_add(child)
                .ok_or(CalcError::Overflow)?,
            Pending::Subtract => self
                .require()?
                .checked_sub(child)
                .ok_or(CalcError::Overflow)?,
            Pending::Multiply => self
                .require()?
                .checked_mul(child)
                .ok_or(CalcError::Overflow)?,
            Pending::Divide { scale } => divide_half_up(self.require()?, child, scale)?,
            Pending::Round { scale } => round_half_up(child, scale),
            Pending::Negate => -child,
            Pending::Abs => child.abs(),
        };
        self.value = Some(combined);
        self.pending = Pending::None;
        Ok(())
    }

    fn require(&self) -> CalcResult<Decimal> {
        self.value.ok_or(CalcError::Uninitialized)
    }
}
