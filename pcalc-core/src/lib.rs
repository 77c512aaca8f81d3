//! Expression parser and evaluator for the `pcalc` programmer's calculator.
//!
//! `pcalc` evaluates C-style integer expressions over 64-bit words:
//! the full C precedence cascade, named mutable variables, compound
//! assignment operators, a `.` "last result" token, and integer
//! literals in the usual C bases plus ternary, base 36, and Roman
//! numerals.
//!
//! The design follows the direct-interpretation model: expressions are
//! evaluated as they are parsed, with no token stream and no AST. A
//! [`eval::Session`] owns all evaluation state (variables, last result,
//! arithmetic mode, accumulated diagnostics) and exposes a single entry
//! point, [`eval::Session::evaluate`].

pub mod cursor;
pub mod error;
pub mod eval;
pub mod number;
pub mod resolver;
pub mod variables;
