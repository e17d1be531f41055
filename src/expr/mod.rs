// ============================================================================
// Expression Module
// Closure-scoped fluent calculation engine
// ============================================================================
//
// The alternative to the explicit-bracket Chain: grouping is delegated to
// the language's lexical closure scoping. Each nested scope is a fresh
// Group handed to a closure and fully resolved before control returns, so
// bracket-matching errors cannot be constructed and result extraction is
// infallible. Both engines produce identical values for equivalent
// formulas.

mod builder;

pub use builder::{Expr, Group};
