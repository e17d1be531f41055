// ============================================================================
// Chain Calculator
// Explicit-bracket fluent engine over a reified scope stack
// ============================================================================

use super::scope::{Frame, Pending};
use crate::numeric::{divide_half_up, round_half_up, CalcError, CalcResult, ToDecimal};
use crate::pool::shared_pool;
use crate::trace::Formula;
use rust_decimal::Decimal;

/// Fluent calculator with explicit open/close parenthesis calls.
///
/// Operations evaluate strictly left-to-right; parenthesis calls override
/// that order by opening a nested scope whose value is combined with the
/// enclosing scope when [`Chain::right_paren`] closes it. Opens and closes
/// are separate method calls, so the bracket-matching stack a parser would
/// keep implicitly is reified here as a stack of scope frames: every open
/// pushes a frame, every close pops one and resolves the deferred operator
/// recorded on the frame below.
///
/// A chain is a single-owner, single-threaded structure; each operation
/// consumes the chain and returns it (or the first error encountered).
///
/// # Example
/// ```
/// use fluent_calc::Chain;
/// use rust_decimal_macros::dec;
///
/// # fn main() -> fluent_calc::CalcResult<()> {
/// // 10 + (2 * 3) = 16, not (10 + 2) * 3
/// let total = Chain::start_with(10)?
///     .add_paren_with(2)?
///     .multiply(3)?
///     .right_paren()?
///     .result()?;
/// assert_eq!(total, dec!(16));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Chain {
    /// Scope stack: index 0 is the root, the last frame is the exposed scope
    frames: Vec<Frame>,
    formula: Formula,
}

impl Chain {
    /// Start a chain with no initial value. The first value must arrive
    /// through an operand-carrying call before any operator is applied.
    pub fn start() -> Self {
        Self {
            frames: vec![Frame::new(None)],
            formula: Formula::new(),
        }
    }

    /// Start a chain with an initial value.
    pub fn start_with(initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        let mut formula = Formula::new();
        formula.push_value(&value);
        Ok(Self {
            frames: vec![Frame::new(Some(value))],
            formula,
        })
    }

    // ========================================================================
    // Simple operators (mutate the exposed scope in place)
    // ========================================================================

    pub fn add(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary("+", &rhs);
        self.apply(move |current| current.checked_add(rhs).ok_or(CalcError::Overflow))
    }

    pub fn subtract(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary("-", &rhs);
        self.apply(move |current| current.checked_sub(rhs).ok_or(CalcError::Overflow))
    }

    pub fn multiply(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary("*", &rhs);
        self.apply(move |current| current.checked_mul(rhs).ok_or(CalcError::Overflow))
    }

    /// Divide the exposed scope's value, rounding HALF-UP to `scale`
    /// fractional digits.
    pub fn divide(mut self, rhs: impl ToDecimal, scale: u32) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary_scaled(&rhs, scale);
        self.apply(move |current| divide_half_up(current, rhs, scale))
    }

    pub fn negate(mut self) -> CalcResult<Self> {
        self.formula.wrap("-(", ")");
        self.apply(|current| Ok(-current))
    }

    pub fn abs(mut self) -> CalcResult<Self> {
        self.formula.wrap("abs(", ")");
        self.apply(|current| Ok(current.abs()))
    }

    /// Round the exposed scope's value HALF-UP to `scale` fractional digits.
    pub fn round(mut self, scale: u32) -> CalcResult<Self> {
        self.formula.wrap_round(scale);
        self.apply(move |current| Ok(round_half_up(current, scale)))
    }

    // ========================================================================
    // Open calls (push a child scope, record the deferred operator)
    // ========================================================================

    /// Open a pure grouping scope: on close, the child's value replaces the
    /// exposed scope's value. Used for precedence override at the start of
    /// an expression.
    pub fn left_paren(self) -> Self {
        self.open(Pending::None, "(", None)
    }

    pub fn left_paren_with(self, initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::None, "(", Some(value)))
    }

    /// Open a scope that will be added to the current value on close,
    /// i.e. `+ (`.
    pub fn add_paren(self) -> Self {
        self.open(Pending::Add, " + (", None)
    }

    pub fn add_paren_with(self, initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::Add, " + (", Some(value)))
    }

    pub fn subtract_paren(self) -> Self {
        self.open(Pending::Subtract, " - (", None)
    }

    pub fn subtract_paren_with(self, initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::Subtract, " - (", Some(value)))
    }

    pub fn multiply_paren(self) -> Self {
        self.open(Pending::Multiply, " * (", None)
    }

    pub fn multiply_paren_with(self, initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::Multiply, " * (", Some(value)))
    }

    /// Open a divisor scope: on close, the current value is divided by the
    /// child's value, rounded HALF-UP to `scale`.
    pub fn divide_paren(self, scale: u32) -> Self {
        self.open(Pending::Divide { scale }, " / (", None)
    }

    pub fn divide_paren_with(self, initial: impl ToDecimal, scale: u32) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::Divide { scale }, " / (", Some(value)))
    }

    /// Open a scope whose closed value will be rounded to `scale` and will
    /// replace the exposed scope's value: `round(child, scale)`.
    pub fn round_paren(self, scale: u32) -> Self {
        self.open(Pending::Round { scale }, "round(", None)
    }

    pub fn round_paren_with(self, initial: impl ToDecimal, scale: u32) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::Round { scale }, "round(", Some(value)))
    }

    /// Open a scope whose negated closed value will replace the exposed
    /// scope's value: `-(child)`.
    pub fn negate_paren(self) -> Self {
        self.open(Pending::Negate, "-(", None)
    }

    pub fn negate_paren_with(self, initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::Negate, "-(", Some(value)))
    }

    /// Open a scope whose absolute closed value will replace the exposed
    /// scope's value: `abs(child)`.
    pub fn abs_paren(self) -> Self {
        self.open(Pending::Abs, "abs(", None)
    }

    pub fn abs_paren_with(self, initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        Ok(self.open(Pending::Abs, "abs(", Some(value)))
    }

    // ========================================================================
    // Close and result
    // ========================================================================

    /// Close the exposed scope and resolve the parent's deferred operator,
    /// returning the parent as the new exposed scope.
    ///
    /// # Errors
    /// - `UnmatchedCloseParen` when called on the root scope
    /// - `Uninitialized` when the closing scope never received a value, or
    ///   the parent needs one for a binary combination
    /// - `DivisionByZero` when resolving a pending divide by a zero child
    /// - `Overflow` when the combined value exceeds the representable range
    pub fn right_paren(mut self) -> CalcResult<Self> {
        if self.frames.len() == 1 {
            return Err(CalcError::UnmatchedCloseParen);
        }
        let child = self
            .frames
            .pop()
            .ok_or(CalcError::UnmatchedCloseParen)?;
        let child_value = child.value.ok_or(CalcError::Uninitialized)?;

        if self.formula.enabled() {
            let pending = self.top().pending;
            match pending {
                Pending::Divide { scale } => self.formula.push(&format!(")[scale {scale}]")),
                Pending::Round { scale } => self.formula.push(&format!(", {scale})")),
                _ => self.formula.push(")"),
            }
        }

        self.top().resolve(child_value)?;
        Ok(self)
    }

    /// Extract the final value, canonicalized through the shared pool.
    ///
    /// # Errors
    /// - `UnclosedParen` when any scope is still open
    /// - `Uninitialized` when the root never received a value
    pub fn result(mut self) -> CalcResult<Decimal> {
        if self.frames.len() != 1 {
            return Err(CalcError::UnclosedParen);
        }
        let root = self.frames.pop().ok_or(CalcError::UnclosedParen)?;
        let value = root.value.ok_or(CalcError::Uninitialized)?;
        let value = shared_pool().get(value);
        self.formula.log_result(&value);
        Ok(value)
    }

    /// Current scope depth; the root alone is depth 1.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn top(&mut self) -> &mut Frame {
        // start() pushes the root and right_paren() refuses to pop it
        self.frames
            .last_mut()
            .expect("scope stack always holds a root frame")
    }

    fn apply(mut self, op: impl FnOnce(Decimal) -> CalcResult<Decimal>) -> CalcResult<Self> {
        let top = self.top();
        let current = top.value.ok_or(CalcError::Uninitialized)?;
        top.value = Some(op(current)?);
        Ok(self)
    }

    fn open(mut self, pending: Pending, fragment: &str, value: Option<Decimal>) -> Self {
        self.formula.push(fragment);
        if let Some(v) = &value {
            self.formula.push_value(v);
        }
        self.top().pending = pending;
        self.frames.push(Frame::new(value));
        self
    }

    #[cfg(test)]
    fn start_with_traced(initial: Decimal) -> Self {
        let mut formula = Formula::inherit(true);
        formula.push_value(&initial);
        Self {
            frames: vec![Frame::new(Some(initial))],
            formula,
        }
    }

    #[cfg(test)]
    pub(crate) fn formula_rendered(&self) -> Option<&str> {
        self.formula.rendered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_left_to_right_evaluation() {
        // 5 + 3 * 2 evaluates as (5 + 3) * 2, never 5 + (3 * 2)
        let result = Chain::start_with(5)
            .unwrap()
            .add(3)
            .unwrap()
            .multiply(2)
            .unwrap()
            .result()
            .unwrap();
        assert_eq!(result, dec!(16));
    }

    #[test]
    fn test_paren_overrides_order() {
        // 10 + (2 * 3) = 16
        let result = Chain::start_with(10)
            .unwrap()
            .add_paren_with(2)
            .unwrap()
            .multiply(3)
            .unwrap()
            .right_paren()
            .unwrap()
            .result()
            .unwrap();
        assert_eq!(result, dec!(16));
    }

    #[test]
    fn test_each_binary_paren_operator() -> CalcResult<()> {
        // 10 + (5 + 3) = 18
        let r = Chain::start_with(10)?
            .add_paren_with(5)?
            .add(3)?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(18));

        // 20 - (10 - 3) = 13
        let r = Chain::start_with(20)?
            .subtract_paren_with(10)?
            .subtract(3)?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(13));

        // 2 * (3 + 4) = 14
        let r = Chain::start_with(2)?
            .multiply_paren_with(3)?
            .add(4)?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(14));

        // 100 / (5 + 5) = 10.00
        let r = Chain::start_with(100)?
            .divide_paren_with(5, 2)?
            .add(5)?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(10.00));
        Ok(())
    }

    #[test]
    fn test_unary_paren_operators() -> CalcResult<()> {
        // round((2.333 + 1.666), 2) = 4.00
        let r = Chain::start()
            .round_paren_with(dec!(2.333), 2)?
            .add(dec!(1.666))?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(4));

        // -(5 - 10) = 5
        let r = Chain::start()
            .negate_paren_with(5)?
            .subtract(10)?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(5));

        // abs(-8 + 3) = 5
        let r = Chain::start()
            .abs_paren_with(-8)?
            .add(3)?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(5));
        Ok(())
    }

    #[test]
    fn test_deep_nesting() -> CalcResult<()> {
        // 1 + (2 * (3 + (4 * (5 + 6)))) = 95
        let r = Chain::start_with(1)?
            .add_paren_with(2)?
            .multiply_paren_with(3)?
            .add_paren_with(4)?
            .multiply_paren_with(5)?
            .add(6)?
            .right_paren()?
            .right_paren()?
            .right_paren()?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(95));
        Ok(())
    }

    #[test]
    fn test_mixed_unary_nesting() -> CalcResult<()> {
        // 10 + abs(-(round((5.6 - 10.4), 1))) = 14.8
        let r = Chain::start_with(10)?
            .add_paren()
            .abs_paren()
            .negate_paren()
            .round_paren_with(dec!(5.6), 1)?
            .subtract(dec!(10.4))?
            .right_paren()?
            .right_paren()?
            .right_paren()?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(14.8));
        Ok(())
    }

    #[test]
    fn test_grouping_paren_on_empty_root() -> CalcResult<()> {
        // (50 + (100 / 3 @ scale 4)) * 2 = 166.6666
        let r = Chain::start()
            .left_paren_with(50)?
            .add_paren_with(100)?
            .divide(3, 4)?
            .right_paren()?
            .right_paren()?
            .multiply(2)?
            .result()?;
        assert_eq!(r, dec!(166.6666));
        Ok(())
    }

    #[test]
    fn test_depth_tracks_open_scopes() {
        let chain = Chain::start_with(1).unwrap();
        assert_eq!(chain.depth(), 1);
        let chain = chain.add_paren_with(2).unwrap();
        assert_eq!(chain.depth(), 2);
        let chain = chain.right_paren().unwrap();
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn test_unmatched_close_fails() {
        let err = Chain::start_with(1).unwrap().right_paren().unwrap_err();
        assert_eq!(err, CalcError::UnmatchedCloseParen);
    }

    #[test]
    fn test_unclosed_scope_fails_at_result() {
        let err = Chain::start_with(1)
            .unwrap()
            .add_paren_with(2)
            .unwrap()
            .add(3)
            .unwrap()
            .result()
            .unwrap_err();
        assert_eq!(err, CalcError::UnclosedParen);
    }

    #[test]
    fn test_operator_on_empty_root_fails() {
        assert_eq!(Chain::start().add(3).unwrap_err(), CalcError::Uninitialized);
        assert_eq!(Chain::start().negate().unwrap_err(), CalcError::Uninitialized);
        assert_eq!(Chain::start().result().unwrap_err(), CalcError::Uninitialized);
    }

    #[test]
    fn test_closing_empty_scope_fails() {
        let err = Chain::start_with(1)
            .unwrap()
            .add_paren()
            .right_paren()
            .unwrap_err();
        assert_eq!(err, CalcError::Uninitialized);
    }

    #[test]
    fn test_division_by_zero() {
        let err = Chain::start_with(1).unwrap().divide(0, 2).unwrap_err();
        assert_eq!(err, CalcError::DivisionByZero);

        // Also when resolving a pending divide against a zero child scope
        let err = Chain::start_with(1)
            .unwrap()
            .divide_paren_with(5, 2)
            .unwrap()
            .subtract(5)
            .unwrap()
            .right_paren()
            .unwrap_err();
        assert_eq!(err, CalcError::DivisionByZero);
    }

    #[test]
    fn test_float_operands_rejected_everywhere() {
        assert_eq!(
            Chain::start_with(1.5f64).unwrap_err(),
            CalcError::FloatOperand
        );
        assert_eq!(
            Chain::start_with(1).unwrap().add(2.5f32).unwrap_err(),
            CalcError::FloatOperand
        );
        assert_eq!(
            Chain::start_with(1)
                .unwrap()
                .add_paren_with(2.5f64)
                .unwrap_err(),
            CalcError::FloatOperand
        );
    }

    #[test]
    fn test_overflow_returns_error() {
        let err = Chain::start_with(Decimal::MAX)
            .unwrap()
            .multiply(2)
            .unwrap_err();
        assert_eq!(err, CalcError::Overflow);

        let err = Chain::start_with(Decimal::MAX)
            .unwrap()
            .add(1)
            .unwrap_err();
        assert_eq!(err, CalcError::Overflow);

        let err = Chain::start_with(Decimal::MIN)
            .unwrap()
            .subtract(1)
            .unwrap_err();
        assert_eq!(err, CalcError::Overflow);
    }

    #[test]
    fn test_overflow_when_resolving_paren() {
        let err = Chain::start_with(Decimal::MAX)
            .unwrap()
            .add_paren_with(Decimal::MAX)
            .unwrap()
            .right_paren()
            .unwrap_err();
        assert_eq!(err, CalcError::Overflow);
    }

    #[test]
    fn test_operandless_open_calls() -> CalcResult<()> {
        // ((2 + 3)) * 4 = 20, the bare grouping scope takes its value from
        // the inner close
        let r = Chain::start()
            .left_paren()
            .left_paren_with(2)?
            .add(3)?
            .right_paren()?
            .right_paren()?
            .multiply(4)?
            .result()?;
        assert_eq!(r, dec!(20));

        // 1 + round((10 / 3 @ scale 4), 2) = 4.33
        let r = Chain::start_with(1)?
            .add_paren()
            .round_paren(2)
            .left_paren_with(10)?
            .divide(3, 4)?
            .right_paren()?
            .right_paren()?
            .right_paren()?
            .result()?;
        assert_eq!(r, dec!(4.33));
        Ok(())
    }

    #[test]
    fn test_division_precision() -> CalcResult<()> {
        let r = Chain::start_with(100)?.divide(3, 2)?.result()?;
        assert_eq!(r, dec!(33.33));
        let r = Chain::start_with(1)?.divide(3, 5)?.result()?;
        assert_eq!(r, dec!(0.33333));
        Ok(())
    }

    #[test]
    fn test_round_idempotence() -> CalcResult<()> {
        let once = Chain::start_with(dec!(3.14159))?.round(2)?.result()?;
        let twice = Chain::start_with(dec!(3.14159))?
            .round(2)?
            .round(2)?
            .result()?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_formula_rendering() -> CalcResult<()> {
        let chain = Chain::start_with_traced(dec!(10))
            .add_paren_with(2)?
            .multiply(3)?
            .right_paren()?
            .subtract(1)?;
        assert_eq!(chain.formula_rendered(), Some("10 + (2 * 3) - 1"));
        assert_eq!(chain.result()?, dec!(15));
        Ok(())
    }

    #[test]
    fn test_formula_rendering_unary_and_scaled() -> CalcResult<()> {
        let chain = Chain::start_with_traced(dec!(100))
            .divide_paren_with(5, 2)?
            .add(5)?
            .right_paren()?
            .negate()?;
        assert_eq!(chain.formula_rendered(), Some("-(100 / (5 + 5)[scale 2])"));
        assert_eq!(chain.result()?, dec!(-10));
        Ok(())
    }
}
