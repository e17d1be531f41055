// ============================================================================
// Expression Builder
// Closure-scoped fluent engine: grouping via lexical scope
// ============================================================================

use crate::numeric::{divide_half_up, round_half_up, CalcError, CalcResult, ToDecimal};
use crate::pool::shared_pool;
use crate::trace::Formula;
use rust_decimal::Decimal;

/// Top-level accumulator of the closure-scoped engine.
///
/// Where [`Chain`](crate::Chain) reifies brackets as explicit open/close
/// calls, this engine delegates grouping to closures: each nested scope is
/// a short-lived [`Group`] handed to a caller-supplied closure, fully
/// resolved before control returns. Every scope has exactly one entry and
/// one exit, so unmatched-bracket errors are impossible by construction,
/// which is why [`Expr::result`] is infallible.
///
/// # Example
/// ```
/// use fluent_calc::Expr;
/// use rust_decimal_macros::dec;
///
/// # fn main() -> fluent_calc::CalcResult<()> {
/// // 10 + (2 * 3) = 16
/// let total = Expr::start_with(10)?
///     .add_group(|g| g.with(2)?.multiply(3))?
///     .result();
/// assert_eq!(total, dec!(16));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Expr {
    value: Decimal,
    formula: Formula,
}

impl Expr {
    /// Start an expression seeded with zero.
    pub fn start() -> Self {
        let mut formula = Formula::new();
        formula.push_value(&Decimal::ZERO);
        Self {
            value: Decimal::ZERO,
            formula,
        }
    }

    /// Start an expression with an initial value.
    pub fn start_with(initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        let mut formula = Formula::new();
        formula.push_value(&value);
        Ok(Self { value, formula })
    }

    // ========================================================================
    // Simple operators
    // ========================================================================

    pub fn add(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary("+", &rhs);
        self.value = self.value.checked_add(rhs).ok_or(CalcError::Overflow)?;
        Ok(self)
    }

    pub fn subtract(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary("-", &rhs);
        self.value = self.value.checked_sub(rhs).ok_or(CalcError::Overflow)?;
        Ok(self)
    }

    pub fn multiply(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary("*", &rhs);
        self.value = self.value.checked_mul(rhs).ok_or(CalcError::Overflow)?;
        Ok(self)
    }

    /// Divide, rounding HALF-UP to `scale` fractional digits.
    pub fn divide(mut self, rhs: impl ToDecimal, scale: u32) -> CalcResult<Self> {
        let rhs = rhs.to_decimal()?;
        self.formula.binary_scaled(&rhs, scale);
        self.value = divide_half_up(self.value, rhs, scale)?;
        Ok(self)
    }

    pub fn negate(mut self) -> Self {
        self.formula.wrap("-(", ")");
        self.value = -self.value;
        self
    }

    pub fn abs(mut self) -> Self {
        self.formula.wrap("abs(", ")");
        self.value = self.value.abs();
        self
    }

    /// Round HALF-UP to `scale` fractional digits.
    pub fn round(mut self, scale: u32) -> Self {
        self.formula.wrap_round(scale);
        self.value = round_half_up(self.value, scale);
        self
    }

    // ========================================================================
    // Grouped operators (closure-scoped sub-expressions)
    // ========================================================================

    /// Add a grouped sub-expression: `value + (group)`.
    pub fn add_group<F>(mut self, group_fn: F) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        self.formula.append_group(" + (", &sub, ")");
        self.value = self.value.checked_add(nested).ok_or(CalcError::Overflow)?;
        Ok(self)
    }

    /// Subtract a grouped sub-expression: `value - (group)`.
    pub fn subtract_group<F>(mut self, group_fn: F) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        self.formula.append_group(" - (", &sub, ")");
        self.value = self.value.checked_sub(nested).ok_or(CalcError::Overflow)?;
        Ok(self)
    }

    /// Multiply by a grouped sub-expression: `value * (group)`.
    pub fn multiply_group<F>(mut self, group_fn: F) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        self.formula.append_group(" * (", &sub, ")");
        self.value = self.value.checked_mul(nested).ok_or(CalcError::Overflow)?;
        Ok(self)
    }

    /// Divide by a grouped sub-expression at the given scale:
    /// `value / (group)`.
    pub fn divide_group<F>(mut self, group_fn: F, scale: u32) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        if self.formula.enabled() {
            self.formula
                .append_group(" / (", &sub, &format!(")[scale {scale}]"));
        }
        self.value = divide_half_up(self.value, nested, scale)?;
        Ok(self)
    }

    /// Extract the final value, canonicalized through the shared pool.
    ///
    /// Infallible: closure scoping closes every group on return, so no
    /// structural violation can survive to this point.
    pub fn result(self) -> Decimal {
        let value = shared_pool().get(self.value);
        self.formula.log_result(&value);
        value
    }

    #[cfg(test)]
    fn start_with_traced(initial: Decimal) -> Self {
        let mut formula = Formula::inherit(true);
        formula.push_value(&initial);
        Self {
            value: initial,
            formula,
        }
    }

    #[cfg(test)]
    pub(crate) fn formula_rendered(&self) -> Option<&str> {
        self.formula.rendered()
    }
}

/// One bounded sub-expression of the closure-scoped engine.
///
/// Created fresh for every nested closure invocation and consumed when the
/// closure returns. Starts uninitialized: simple operators require
/// [`Group::with`] first, while grouped operators tolerate an uninitialized
/// receiver by falling back to the operator's identity seed (0 for
/// add/subtract, 1 for multiply/divide; subtract additionally negates and
/// divide additionally inverts, mirroring `0 - x` and `1 / x`).
#[derive(Debug)]
pub struct Group {
    value: Option<Decimal>,
    formula: Formula,
}

impl Group {
    fn new(trace_enabled: bool) -> Self {
        Self {
            value: None,
            formula: Formula::inherit(trace_enabled),
        }
    }

    /// Invoke a group closure with a fresh builder and extract its terminal
    /// value. A closure that never initializes its builder is an error.
    fn run<F>(group_fn: F, trace_enabled: bool) -> CalcResult<(Decimal, Formula)>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let group = group_fn(Group::new(trace_enabled))?;
        let value = group.value.ok_or(CalcError::Uninitialized)?;
        Ok((value, group.formula))
    }

    /// Set the group's initial value. Must precede any simple operator.
    pub fn with(mut self, initial: impl ToDecimal) -> CalcResult<Self> {
        let value = initial.to_decimal()?;
        self.formula.push_value(&value);
        self.value = Some(value);
        Ok(self)
    }

    // ========================================================================
    // Simple operators (require initialization)
    // ========================================================================

    pub fn add(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let current = self.initialized()?;
        let rhs = rhs.to_decimal()?;
        self.formula.binary("+", &rhs);
        self.value = Some(current.checked_add(rhs).ok_or(CalcError::Overflow)?);
        Ok(self)
    }

    pub fn subtract(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let current = self.initialized()?;
        let rhs = rhs.to_decimal()?;
        self.formula.binary("-", &rhs);
        self.value = Some(current.checked_sub(rhs).ok_or(CalcError::Overflow)?);
        Ok(self)
    }

    pub fn multiply(mut self, rhs: impl ToDecimal) -> CalcResult<Self> {
        let current = self.initialized()?;
        let rhs = rhs.to_decimal()?;
        self.formula.binary("*", &rhs);
        self.value = Some(current.checked_mul(rhs).ok_or(CalcError::Overflow)?);
        Ok(self)
    }

    pub fn divide(mut self, rhs: impl ToDecimal, scale: u32) -> CalcResult<Self> {
        let current = self.initialized()?;
        let rhs = rhs.to_decimal()?;
        self.formula.binary_scaled(&rhs, scale);
        self.value = Some(divide_half_up(current, rhs, scale)?);
        Ok(self)
    }

    pub fn negate(mut self) -> CalcResult<Self> {
        let current = self.initialized()?;
        self.formula.wrap("-(", ")");
        self.value = Some(-current);
        Ok(self)
    }

    pub fn abs(mut self) -> CalcResult<Self> {
        let current = self.initialized()?;
        self.formula.wrap("abs(", ")");
        self.value = Some(current.abs());
        Ok(self)
    }

    pub fn round(mut self, scale: u32) -> CalcResult<Self> {
        let current = self.initialized()?;
        self.formula.wrap_round(scale);
        self.value = Some(round_half_up(current, scale));
        Ok(self)
    }

    // ========================================================================
    // Grouped operators (tolerate an uninitialized receiver)
    // ========================================================================

    /// Add a nested group. Uninitialized receiver: the nested result is
    /// taken as-is (identity seed 0).
    pub fn add_group<F>(mut self, group_fn: F) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        match self.value {
            Some(current) => {
                self.formula.append_group(" + (", &sub, ")");
                self.value = Some(current.checked_add(nested).ok_or(CalcError::Overflow)?);
            },
            None => {
                self.formula.append_group("(", &sub, ")");
                self.value = Some(nested);
            },
        }
        Ok(self)
    }

    /// Subtract a nested group. Uninitialized receiver: the nested result
    /// is negated (identity seed 0, as `0 - x`).
    pub fn subtract_group<F>(mut self, group_fn: F) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        match self.value {
            Some(current) => {
                self.formula.append_group(" - (", &sub, ")");
                self.value = Some(current.checked_sub(nested).ok_or(CalcError::Overflow)?);
            },
            None => {
                self.formula.append_group("-(", &sub, ")");
                self.value = Some(-nested);
            },
        }
        Ok(self)
    }

    /// Multiply by a nested group. Uninitialized receiver: the nested
    /// result is taken as-is (identity seed 1).
    pub fn multiply_group<F>(mut self, group_fn: F) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        match self.value {
            Some(current) => {
                self.formula.append_group(" * (", &sub, ")");
                self.value = Some(current.checked_mul(nested).ok_or(CalcError::Overflow)?);
            },
            None => {
                self.formula.append_group("(", &sub, ")");
                self.value = Some(nested);
            },
        }
        Ok(self)
    }

    /// Divide by a nested group at the given scale. Uninitialized
    /// receiver: the reciprocal of the nested result (identity seed 1, as
    /// `1 / x`).
    pub fn divide_group<F>(mut self, group_fn: F, scale: u32) -> CalcResult<Self>
    where
        F: FnOnce(Group) -> CalcResult<Group>,
    {
        let (nested, sub) = Group::run(group_fn, self.formula.enabled())?;
        match self.value {
            Some(current) => {
                if self.formula.enabled() {
                    self.formula
                        .append_group(" / (", &sub, &format!(")[scale {scale}]"));
                }
                self.value = Some(divide_half_up(current, nested, scale)?);
            },
            None => {
                if self.formula.enabled() {
                    self.formula
                        .append_group("1 / (", &sub, &format!(")[scale {scale}]"));
                }
                self.value = Some(divide_half_up(Decimal::ONE, nested, scale)?);
            },
        }
        Ok(self)
    }

    fn initialized(&self) -> CalcResult<Decimal> {
        self.value.ok_or(CalcError::Uninitialized)
    }
}
