// ============================================================================
// Fluent Calc Library
// Arbitrary-precision decimal arithmetic with fluent, grouped composition
// ============================================================================

//! # Fluent Calc
//!
//! Multi-step decimal arithmetic through method chaining, with
//! mathematically correct grouping and no textual expression grammar.
//!
//! ## Features
//!
//! - **Exact decimal arithmetic** on [`rust_decimal::Decimal`]; rounding
//!   (HALF-UP) happens only where a target scale is explicitly requested
//! - **Two grouping styles** with identical numeric results: explicit
//!   open/close parenthesis calls ([`Chain`]) and closure-scoped groups
//!   ([`Expr`]) where unmatched brackets are impossible by construction
//! - **Float rejection**: f32/f64 operands fail at every entry point, so
//!   binary floating-point error never enters a computation
//! - **Decimal interning** through a pluggable, concurrency-safe pool that
//!   canonicalizes results
//! - **Formula tracing**: an opt-in diagnostic log line showing the infix
//!   rendition of each completed computation
//!
//! ## Example
//!
//! ```rust
//! use fluent_calc::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! # fn main() -> fluent_calc::CalcResult<()> {
//! // Explicit brackets: 10 + (2 * 3) = 16
//! let chained = Chain::start_with(10)?
//!     .add_paren_with(2)?
//!     .multiply(3)?
//!     .right_paren()?
//!     .result()?;
//! assert_eq!(chained, dec!(16));
//!
//! // Closure scoping, same formula
//! let grouped = Expr::start_with(10)?
//!     .add_group(|g| g.with(2)?.multiply(3))?
//!     .result();
//! assert_eq!(grouped, chained);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod expr;
pub mod numeric;
pub mod ops;
pub mod pool;
pub mod trace;

pub use chain::Chain;
pub use expr::{Expr, Group};
pub use numeric::{CalcError, CalcResult};

// Re-exports for convenience
pub mod prelude {
    pub use crate::chain::Chain;
    pub use crate::expr::{Expr, Group};
    pub use crate::numeric::{CalcError, CalcResult, ToDecimal};
    pub use crate::pool::{
        clear_shared_pool, set_shared_pool, shared_pool, CachingDecimalPool, DecimalPool,
        NoOpDecimalPool,
    };
    pub use crate::trace::{disable_tracing, enable_tracing, tracing_enabled};
}
