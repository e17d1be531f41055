// ============================================================================
// Chain Module
// Explicit-bracket fluent calculation engine
// ============================================================================
//
// This module provides:
// - Chain: left-to-right fluent calculator with explicit paren calls
// - Frame/Pending (private): the reified bracket-matching scope stack
//
// Open and close markers arrive as separate method calls interleaved with
// arbitrary operators, so scoping cannot lean on lexical structure; the
// scope stack carries it instead. Malformed nesting is always detected:
// a close without an open fails immediately, an open without a close fails
// at result extraction.

mod calc;
mod scope;

pub use calc::Chain;
