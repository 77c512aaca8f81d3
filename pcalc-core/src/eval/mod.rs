//! The evaluator session.
//!
//! [`Session`] owns everything a sequence of evaluations needs:
//! the variable table, the last result, the arithmetic mode, the
//! host resolver for read-only names, and the accumulated diagnostics.
//! Expressions are parsed and evaluated in one pass by mutually
//! recursive methods over a [`Cursor`]; every method returns a value,
//! and anything that goes wrong is recorded as a diagnostic with a
//! defined fallback value.
//!
//! The assignment level lives here; the rest of the precedence cascade
//! is in [`expr`].

use crate::cursor::Cursor;
use crate::error::{ErrorKind, EvalError, Severity};
use crate::resolver::{NullResolver, VarResolver};
use crate::variables::{is_reserved, Variables};

mod expr;
#[cfg(test)]
mod tests;

/// Maximum nesting depth of the grammar recursion. Deeper input is a
/// diagnostic, not a stack overflow.
pub const MAX_DEPTH: u32 = 200;

// ---------------------------------------------------------------------------
// Arithmetic mode
// ---------------------------------------------------------------------------

/// Signedness regime for arithmetic and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithMode {
    /// Historical behavior: unsigned wrapping arithmetic with mixed
    /// signed/unsigned overflow checks, signed relationals.
    Auto,
    /// Two's-complement signed 64-bit arithmetic throughout.
    Signed,
    /// Unsigned 64-bit arithmetic throughout.
    Unsigned,
}

impl ArithMode {
    /// The mode's name as used by the `mode` command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Evaluation state that persists across inputs.
pub struct Session {
    variables: Variables,
    last_result: u64,
    mode: ArithMode,
    resolver: Box<dyn VarResolver>,
    errors: Vec<EvalError>,
    /// Set when the final statement's value should not be printed
    /// (trailing `;`, or an unset).
    output_suppressed: bool,
    /// Set during an unset terminated by `;`: the confirmation note is
    /// skipped as well.
    unset_silent: bool,
    depth: u32,
}

impl Session {
    /// Create a session with no host resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(Box::new(NullResolver))
    }

    /// Create a session resolving read-only names through `resolver`.
    #[must_use]
    pub fn with_resolver(resolver: Box<dyn VarResolver>) -> Self {
        Self {
            variables: Variables::new(),
            last_result: 0,
            mode: ArithMode::Auto,
            resolver,
            errors: Vec::new(),
            output_suppressed: false,
            unset_silent: false,
            depth: 0,
        }
    }

    /// The variable table.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Mutable access to the variable table (the host uses this to
    /// seed registers).
    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// The result of the last completed evaluation.
    #[must_use]
    pub const fn last_result(&self) -> u64 {
        self.last_result
    }

    /// The current arithmetic mode.
    #[must_use]
    pub const fn mode(&self) -> ArithMode {
        self.mode
    }

    /// Switch arithmetic mode.
    pub fn set_mode(&mut self, mode: ArithMode) {
        self.mode = mode;
    }

    /// Whether the last evaluation asked for its value not to be
    /// printed.
    #[must_use]
    pub const fn output_suppressed(&self) -> bool {
        self.output_suppressed
    }

    /// Drain the diagnostics accumulated since the last drain.
    pub fn take_errors(&mut self) -> Vec<EvalError> {
        std::mem::take(&mut self.errors)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Evaluate an input line: one or more `;`-separated statements.
    ///
    /// Returns the value of the final statement and stores it as the
    /// last result. A trailing `;` suppresses output; empty input
    /// returns the last result unchanged.
    pub fn evaluate(&mut self, text: &str) -> u64 {
        self.output_suppressed = false;
        self.unset_silent = false;

        let mut cur = Cursor::new(text);
        cur.skip_whitespace();
        if cur.at_end() {
            return self.last_result;
        }

        let mut value = self.assignment_expr(&mut cur);
        cur.skip_whitespace();
        while cur.peek() == Some(b';') {
            cur.bump();
            cur.skip_whitespace();
            if cur.at_end() {
                self.output_suppressed = true;
                break;
            }
            value = self.assignment_expr(&mut cur);
            cur.skip_whitespace();
        }

        self.last_result = value;
        value
    }

    /// One-shot evaluation returning the value together with the
    /// diagnostics it produced.
    pub fn evaluate_expression(&mut self, text: &str) -> (u64, Vec<EvalError>) {
        let value = self.evaluate(text);
        (value, self.take_errors())
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    pub(crate) fn error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(EvalError::new(kind, message));
    }

    pub(crate) fn warning(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors
            .push(EvalError::new(kind, message).with_severity(Severity::Warning));
    }

    fn note(&mut self, message: impl Into<String>) {
        self.errors
            .push(EvalError::new(ErrorKind::Note, message).with_severity(Severity::Info));
    }

    // -----------------------------------------------------------------------
    // Assignment level
    // -----------------------------------------------------------------------

    /// Top of the precedence cascade, with the recursion guard. Every
    /// recursive grammar entry goes through here.
    pub(crate) fn assignment_expr(&mut self, cur: &mut Cursor<'_>) -> u64 {
        if self.depth >= MAX_DEPTH {
            self.error(ErrorKind::RecursionLimit, "expression nesting too deep");
            cur.set_pos(usize::MAX);
            return 0;
        }
        self.depth += 1;
        let value = self.assignment_inner(cur);
        self.depth -= 1;
        value
    }

    fn assignment_inner(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let start = cur.pos();

        if let Some(name) = cur.read_name() {
            cur.skip_whitespace();

            if cur.peek() == Some(b'=') && cur.peek_at(1) != Some(b'=') {
                cur.bump();
                cur.skip_whitespace();

                if cur.at_end() || cur.peek() == Some(b';') {
                    // `name=` unsets; `name=;` unsets without the note.
                    self.unset_silent = cur.peek() == Some(b';');
                    self.remove_variable(&name);
                    self.output_suppressed = true;
                    return 0;
                }

                let value = self.assignment_expr(cur);
                if self.output_suppressed {
                    // RHS ended in an unset: the whole chain unsets.
                    self.remove_variable(&name);
                    return value;
                }
                return self.store(&name, value);
            }

            if let Some(op) = peek_compound(cur) {
                return self.do_assignment_operator(cur, &name, op);
            }
        }

        cur.set_pos(start);
        let value = self.logical_or(cur);
        cur.skip_whitespace();
        if cur.peek() == Some(b'=') && cur.peek_at(1) != Some(b'=') {
            self.error(
                ErrorKind::NotAssignable,
                "left hand side of expression is not assignable",
            );
        }
        value
    }

    /// `name OP= expr`. The target is created at 0 when it does not
    /// exist locally and is not read-only.
    fn do_assignment_operator(&mut self, cur: &mut Cursor<'_>, name: &str, op: CompoundOp) -> u64 {
        cur.advance(op.len());
        cur.skip_whitespace();

        let rhs = self.assignment_expr(cur);
        self.output_suppressed = false;

        let current = match self.variables.lookup(name) {
            Some(v) => v,
            None => {
                if is_reserved(name) || self.resolver.resolve(name).is_some() {
                    self.error(
                        ErrorKind::ReadOnlyVariable,
                        format!("can't assign '{name}': read-only variable"),
                    );
                    return 0;
                }
                0
            }
        };

        let value = match op {
            CompoundOp::Add => self.add_values(current, rhs),
            CompoundOp::Sub => self.sub_values(current, rhs),
            CompoundOp::Mul => self.mul_values(current, rhs),
            CompoundOp::Div => self.div_values(current, rhs),
            CompoundOp::Rem => self.rem_values(current, rhs),
            CompoundOp::And => current & rhs,
            CompoundOp::Xor => current ^ rhs,
            CompoundOp::Or => current | rhs,
            CompoundOp::Shl => self.shl_values(current, rhs),
            CompoundOp::Shr => self.shr_values(current, rhs),
        };

        self.store(name, value)
    }

    /// Store a value, guarding reserved and resolver-provided names.
    /// Returns the value actually stored (truncated for registers), or
    /// 0 on a read-only target.
    pub(crate) fn store(&mut self, name: &str, value: u64) -> u64 {
        if is_reserved(name)
            || (!self.variables.contains(name) && self.resolver.resolve(name).is_some())
        {
            self.error(
                ErrorKind::ReadOnlyVariable,
                format!("can't assign '{name}': read-only variable"),
            );
            return 0;
        }
        self.variables.set(name, value)
    }

    /// Unset a variable, with the appropriate diagnostics for names
    /// that cannot be unset.
    fn remove_variable(&mut self, name: &str) {
        if is_reserved(name) {
            self.error(
                ErrorKind::ReadOnlyVariable,
                format!("can't unset '{name}': read-only variable"),
            );
            return;
        }
        if crate::variables::register_spec(name).is_some() {
            self.error(
                ErrorKind::RegisterUnset,
                format!("can't unset register '{name}'"),
            );
            return;
        }
        if !self.variables.contains(name) && self.resolver.resolve(name).is_some() {
            self.error(
                ErrorKind::ReadOnlyVariable,
                format!("can't unset '{name}': read-only variable"),
            );
            return;
        }
        let existed = self.variables.remove(name);
        if existed && !self.unset_silent {
            self.note(format!("Variable '{name}' unset"));
        }
    }

    /// Look up `name` for reading: local table first, then the host
    /// resolver. Unknown names are auto-created at zero with a warning.
    pub(crate) fn read_variable(&mut self, name: &str) -> u64 {
        if let Some(v) = self.variables.lookup(name) {
            return v;
        }
        if let Some(v) = self.resolver.resolve(name) {
            return v;
        }
        self.warning(
            ErrorKind::UnknownVariable,
            format!("no such variable: {name} (assigning value of zero)"),
        );
        self.variables.set(name, 0);
        0
    }

    /// Whether `name` may be stepped with `++`/`--` (must exist in the
    /// local table; resolver names and keywords are read-only).
    pub(crate) fn step_target(&mut self, name: &str) -> Option<u64> {
        if is_reserved(name)
            || (!self.variables.contains(name) && self.resolver.resolve(name).is_some())
        {
            self.error(
                ErrorKind::ReadOnlyVariable,
                format!("can't assign '{name}': read-only variable"),
            );
            return None;
        }
        Some(self.variables.lookup(name).unwrap_or(0))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("last_result", &self.last_result)
            .field("mode", &self.mode)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Compound assignment operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Xor,
    Or,
    Shl,
    Shr,
}

impl CompoundOp {
    /// Length of the operator's spelling, `=` included.
    const fn len(self) -> usize {
        match self {
            Self::Shl | Self::Shr => 3,
            _ => 2,
        }
    }
}

/// Recognize a compound assignment operator at the cursor without
/// consuming it.
fn peek_compound(cur: &Cursor<'_>) -> Option<CompoundOp> {
    if cur.starts_with("<<=") {
        return Some(CompoundOp::Shl);
    }
    if cur.starts_with(">>=") {
        return Some(CompoundOp::Shr);
    }
    if cur.peek_at(1) != Some(b'=') {
        return None;
    }
    match cur.peek()? {
        b'+' => Some(CompoundOp::Add),
        b'-' => Some(CompoundOp::Sub),
        b'*' => Some(CompoundOp::Mul),
        b'/' => Some(CompoundOp::Div),
        b'%' => Some(CompoundOp::Rem),
        b'&' => Some(CompoundOp::And),
        b'^' => Some(CompoundOp::Xor),
        b'|' => Some(CompoundOp::Or),
        _ => None,
    }
}
