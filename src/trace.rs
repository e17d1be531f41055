// ============================================================================
// Formula Tracing
// Optional diagnostic rendering of evaluated formulas
// ============================================================================
//
// When tracing is enabled, every completed top-level computation logs a
// left-to-right infix rendition of the formula it evaluated, with
// parenthesized sub-expressions shown as such. This is a diagnostic side
// channel only: it never influences computed results.

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};

static TRACE_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable formula tracing process-wide.
///
/// The flag is sampled when a chain or expression *starts*, so toggling it
/// has no effect on computations already in flight. Treat this as a rare
/// administrative action, not a per-call switch.
pub fn enable_tracing() {
    TRACE_ENABLED.store(true, Ordering::Relaxed);
}

/// Disable formula tracing process-wide.
pub fn disable_tracing() {
    TRACE_ENABLED.store(false, Ordering::Relaxed);
}

/// Whether formula tracing is currently enabled.
pub fn tracing_enabled() -> bool {
    TRACE_ENABLED.load(Ordering::Relaxed)
}

/// Accumulates the textual rendition of a formula while it is being built.
///
/// Holds `None` when tracing was disabled at construction time, in which
/// case every method is a no-op and no allocation happens.
#[derive(Debug)]
pub(crate) struct Formula(Option<String>);

impl Formula {
    /// Create a formula buffer, sampling the process-wide trace flag.
    pub fn new() -> Self {
        Self(tracing_enabled().then(String::new))
    }

    /// Create a formula buffer inheriting an already-sampled flag.
    ///
    /// Nested scopes use this so a whole computation renders consistently
    /// even if the flag is flipped while it runs.
    pub fn inherit(enabled: bool) -> Self {
        Self(enabled.then(String::new))
    }

    pub fn enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Append a literal fragment, e.g. `" + ("`.
    pub fn push(&mut self, fragment: &str) {
        if let Some(buf) = &mut self.0 {
            buf.push_str(fragment);
        }
    }

    /// Append an operand value.
    pub fn push_value(&mut self, value: &Decimal) {
        if let Some(buf) = &mut self.0 {
            buf.push_str(&value.to_string());
        }
    }

    /// Append a binary operator and its right operand, e.g. `" + 3"`.
    pub fn binary(&mut self, symbol: &str, rhs: &Decimal) {
        if let Some(buf) = &mut self.0 {
            buf.push(' ');
            buf.push_str(symbol);
            buf.push(' ');
            buf.push_str(&rhs.to_string());
        }
    }

    /// Append a division operand with its scale annotation, e.g.
    /// `" / 3[scale 2]"`.
    pub fn binary_scaled(&mut self, rhs: &Decimal, scale: u32) {
        if let Some(buf) = &mut self.0 {
            buf.push_str(&format!(" / {rhs}[scale {scale}]"));
        }
    }

    /// Wrap the whole buffer, e.g. `"-("` .. `")"` or `"abs("` .. `")"`.
    pub fn wrap(&mut self, prefix: &str, suffix: &str) {
        if let Some(buf) = &mut self.0 {
            *buf = format!("{prefix}{buf}{suffix}");
        }
    }

    /// Wrap the whole buffer in a `round(.., scale)` call.
    pub fn wrap_round(&mut self, scale: u32) {
        if let Some(buf) = &mut self.0 {
            *buf = format!("round({buf}, {scale})");
        }
    }

    /// Append a fully-rendered sub-expression between a prefix and suffix,
    /// e.g. `" + ("` .. nested .. `")"`.
    pub fn append_group(&mut self, prefix: &str, nested: &Formula, suffix: &str) {
        if let (Some(buf), Some(sub)) = (&mut self.0, &nested.0) {
            buf.push_str(prefix);
            buf.push_str(sub);
            buf.push_str(suffix);
        }
    }

    /// Emit the completed formula for a finished top-level computation.
    pub fn log_result(&self, result: &Decimal) {
        if let Some(buf) = &self.0 {
            tracing::debug!("calc: {} = {}", buf, result);
        }
    }

    #[cfg(test)]
    pub fn rendered(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_toggle_is_sampled_at_construction() {
        enable_tracing();
        assert!(tracing_enabled());
        let f = Formula::new();
        disable_tracing();
        // The buffer keeps the flag it sampled when it was created
        assert!(f.enabled());
    }

    #[test]
    fn test_disabled_formula_stays_empty() {
        let mut f = Formula::inherit(false);
        f.push_value(&dec!(10));
        f.binary("+", &dec!(3));
        assert_eq!(f.rendered(), None);
    }

    #[test]
    fn test_formula_rendering() {
        let mut f = Formula::inherit(true);
        f.push_value(&dec!(10));
        f.binary("+", &dec!(3));
        f.binary_scaled(&dec!(4), 2);
        assert_eq!(f.rendered(), Some("10 + 3 / 4[scale 2]"));
    }

    #[test]
    fn test_formula_wrapping() {
        let mut f = Formula::inherit(true);
        f.push_value(&dec!(5));
        f.wrap("abs(", ")");
        f.wrap_round(1);
        assert_eq!(f.rendered(), Some("round(abs(5), 1)"));
    }

    #[test]
    fn test_nested_group_rendering() {
        let mut outer = Formula::inherit(true);
        outer.push_value(&dec!(10));
        let mut inner = Formula::inherit(true);
        inner.push_value(&dec!(2));
        inner.binary("*", &dec!(3));
        outer.append_group(" + (", &inner, ")");
        assert_eq!(outer.rendered(), Some("10 + (2 * 3)"));
    }
}
