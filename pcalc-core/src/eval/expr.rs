//! The precedence cascade below assignment.
//!
//! One method per precedence level, mirroring the C operator table:
//! logical-or, logical-and, bitwise-or, xor, bitwise-and, equality,
//! relational, shift, additive, multiplicative, unary, primary. Each
//! level parses its left operand from the level below, then folds
//! operators at its own level left to right.
//!
//! `&&` and `||` always evaluate both sides. That is deliberate: in a
//! calculator the operands are wanted for their side effects
//! (assignments, `++`) even when the logical value is already decided.

use crate::cursor::Cursor;
use crate::error::ErrorKind;
use crate::number;
use crate::variables::is_reserved;

use super::{ArithMode, Session};

/// Characters that may legally follow a complete multiplicative
/// expression. Anything else stops the parse with a diagnostic.
const OPERATOR_FOLLOW: &[u8] = b"*/%+-|&^!~)}]<>;=";

impl Session {
    // -----------------------------------------------------------------------
    // Binary levels
    // -----------------------------------------------------------------------

    pub(crate) fn logical_or(&mut self, cur: &mut Cursor<'_>) -> u64 {
        // Reaching a plain expression cancels any pending suppression
        // from an unset earlier in the recursion.
        self.output_suppressed = false;

        cur.skip_whitespace();
        let mut sum = self.logical_and(cur);
        cur.skip_whitespace();
        while cur.starts_with("||") {
            cur.advance(2);
            cur.skip_whitespace();
            let val = self.logical_and(cur);
            sum = u64::from(val != 0 || sum != 0);
            cur.skip_whitespace();
        }
        sum
    }

    fn logical_and(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.bitwise_or(cur);
        cur.skip_whitespace();
        while cur.starts_with("&&") {
            cur.advance(2);
            cur.skip_whitespace();
            let val = self.bitwise_or(cur);
            sum = u64::from(val != 0 && sum != 0);
            cur.skip_whitespace();
        }
        sum
    }

    fn bitwise_or(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.xor(cur);
        cur.skip_whitespace();
        while cur.peek() == Some(b'|') && cur.peek_at(1) != Some(b'|') {
            cur.bump();
            cur.skip_whitespace();
            sum |= self.xor(cur);
            cur.skip_whitespace();
        }
        sum
    }

    fn xor(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.bitwise_and(cur);
        cur.skip_whitespace();
        while cur.peek() == Some(b'^') {
            cur.bump();
            cur.skip_whitespace();
            sum ^= self.bitwise_and(cur);
            cur.skip_whitespace();
        }
        sum
    }

    fn bitwise_and(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.equality(cur);
        cur.skip_whitespace();
        while cur.peek() == Some(b'&') && cur.peek_at(1) != Some(b'&') {
            cur.bump();
            cur.skip_whitespace();
            sum &= self.equality(cur);
            cur.skip_whitespace();
        }
        sum
    }

    fn equality(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.relational(cur);
        cur.skip_whitespace();
        while cur.starts_with("==") || cur.starts_with("!=") {
            let negated = cur.peek() == Some(b'!');
            cur.advance(2);
            cur.skip_whitespace();
            let val = self.relational(cur);
            sum = u64::from((sum == val) != negated);
            cur.skip_whitespace();
        }
        sum
    }

    /// Relational comparisons are signed unless the session is in
    /// unsigned mode, so that `0 > -1` holds.
    fn relational(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.shift(cur);
        cur.skip_whitespace();
        while let Some(op @ (b'<' | b'>')) = cur.peek() {
            let or_equal = cur.peek_at(1) == Some(b'=');
            cur.advance(if or_equal { 2 } else { 1 });
            cur.skip_whitespace();
            let val = self.shift(cur);
            let holds = if self.mode == ArithMode::Unsigned {
                compare(sum, val, op, or_equal)
            } else {
                compare(sum as i64, val as i64, op, or_equal)
            };
            sum = u64::from(holds);
            cur.skip_whitespace();
        }
        sum
    }

    fn shift(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.additive(cur);
        cur.skip_whitespace();
        while cur.starts_with("<<") || cur.starts_with(">>") {
            let left = cur.peek() == Some(b'<');
            cur.advance(2);
            cur.skip_whitespace();
            let val = self.additive(cur);
            sum = if left {
                self.shl_values(sum, val)
            } else {
                self.shr_values(sum, val)
            };
            cur.skip_whitespace();
        }
        sum
    }

    fn additive(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.term(cur);
        cur.skip_whitespace();
        while let Some(op @ (b'+' | b'-')) = cur.peek() {
            cur.bump();
            cur.skip_whitespace();
            let val = self.term(cur);
            sum = if op == b'+' {
                self.add_values(sum, val)
            } else {
                self.sub_values(sum, val)
            };
            cur.skip_whitespace();
        }
        sum
    }

    fn term(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();
        let mut sum = self.factor(cur);
        cur.skip_whitespace();
        while let Some(op @ (b'*' | b'/' | b'%')) = cur.peek() {
            cur.bump();
            cur.skip_whitespace();
            let val = self.factor(cur);
            sum = match op {
                b'*' => self.mul_values(sum, val),
                b'/' => self.div_values(sum, val),
                _ => self.rem_values(sum, val),
            };
            cur.skip_whitespace();
        }

        // Bottom of the parse: whatever follows must be an operator
        // some level above us knows, or the end of the statement.
        if let Some(c) = cur.peek() {
            if !OPERATOR_FOLLOW.contains(&c) {
                self.error(
                    ErrorKind::UnknownOperator,
                    format!("parsing stopped: unknown operator '{}'", cur.rest()),
                );
            }
        }

        sum
    }

    // -----------------------------------------------------------------------
    // Unary level
    // -----------------------------------------------------------------------

    fn factor(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.skip_whitespace();

        let mut op = 0u8;
        let mut step_pos = None;

        if let Some(c @ (b'-' | b'+' | b'~' | b'!')) = cur.peek() {
            op = c;
            let doubled = (c == b'-' || c == b'+') && cur.peek_at(1) == Some(c);
            cur.advance(if doubled { 2 } else { 1 });
            cur.skip_whitespace();
            if doubled {
                step_pos = Some(cur.pos());
            }
        }

        let mut val = self.get_value(cur);
        cur.skip_whitespace();

        if let Some(name_pos) = step_pos {
            // The operand was evaluated above (creating the variable
            // if it was unknown); now re-read the name and step the
            // stored value.
            let mut probe = cur.clone();
            probe.set_pos(name_pos);
            match probe.read_name() {
                None => {
                    self.error(ErrorKind::BadExpression, "can only use ++/-- on variables");
                }
                Some(name) => {
                    if let Some(current) = self.step_target(&name) {
                        let stepped = if op == b'+' {
                            current.wrapping_add(1)
                        } else {
                            current.wrapping_sub(1)
                        };
                        val = self.variables.set(&name, stepped);
                    }
                }
            }
        } else {
            match op {
                b'-' => val = val.wrapping_neg(),
                b'!' => val = u64::from(val == 0),
                b'~' => val = !val,
                _ => {}
            }
        }

        val
    }

    // -----------------------------------------------------------------------
    // Primary level
    // -----------------------------------------------------------------------

    fn get_value(&mut self, cur: &mut Cursor<'_>) -> u64 {
        match cur.peek() {
            Some(b'\'') => self.char_constant(cur),
            Some(c) if c.is_ascii_digit() => {
                let (val, overflow) = number::read_integer(cur, 0);
                if overflow {
                    self.warning(ErrorKind::Overflow, "integer literal out of range");
                }
                cur.skip_whitespace();
                val
            }
            Some(b'.') => {
                cur.bump();
                cur.skip_whitespace();
                self.last_result
            }
            Some(b'(') => self.grouping(cur, b'(', b')', None),
            Some(b'{') => self.grouping(cur, b'{', b'}', Some(ArithMode::Unsigned)),
            Some(b'[') => self.grouping(cur, b'[', b']', Some(ArithMode::Signed)),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.variable_value(cur),
            _ => {
                self.error(
                    ErrorKind::BadExpression,
                    format!(
                        "expecting grouping, unary op, constant or variable, got: '{}'",
                        cur.rest()
                    ),
                );
                0
            }
        }
    }

    /// Character constant: up to 8 bytes packed big-endian into the
    /// word. `\` escapes the next byte verbatim.
    fn char_constant(&mut self, cur: &mut Cursor<'_>) -> u64 {
        cur.bump();
        let mut val: u64 = 0;
        let mut count = 0;

        while let Some(c) = cur.peek() {
            if c == b'\'' || count >= 8 {
                break;
            }
            let byte = if c == b'\\' {
                cur.bump();
                match cur.peek() {
                    Some(escaped) => escaped,
                    None => {
                        self.error(ErrorKind::BadCharConstant, "invalid escape sequence");
                        return 0;
                    }
                }
            } else {
                c
            };
            val = (val << 8) | u64::from(byte);
            cur.bump();
            count += 1;
        }

        if cur.peek() != Some(b'\'') {
            self.warning(
                ErrorKind::BadCharConstant,
                "character constant not terminated or too long (max len == 8 bytes)",
            );
            while let Some(c) = cur.peek() {
                if c == b'\'' {
                    break;
                }
                cur.bump();
            }
        }
        if cur.peek() == Some(b'\'') {
            cur.bump();
        }

        val
    }

    /// Grouped sub-expression. The matching close is found by a
    /// same-pair depth scan; the text between is evaluated through the
    /// top-level entry point, so `;`-separated statements inside a
    /// grouping work and update the last result. `{}` forces unsigned
    /// mode and `[]` forces signed mode for the nested evaluation only.
    fn grouping(
        &mut self,
        cur: &mut Cursor<'_>,
        open: u8,
        close: u8,
        forced: Option<ArithMode>,
    ) -> u64 {
        cur.bump();
        let start = cur.pos();

        let mut depth: usize = 1;
        let mut end = None;
        let mut offset = 0;
        while let Some(c) = cur.peek_at(offset) {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + offset);
                    break;
                }
            }
            offset += 1;
        }

        let Some(end) = end else {
            self.error(
                ErrorKind::MismatchedGrouping,
                format!("mismatched grouping: missing '{}'", char::from(close)),
            );
            cur.set_pos(usize::MAX);
            return 0;
        };

        let inner = cur.slice(start, end);

        let saved_mode = self.mode;
        let saved_suppressed = self.output_suppressed;
        let saved_silent = self.unset_silent;
        if let Some(mode) = forced {
            self.mode = mode;
        }

        let val = self.evaluate(inner);

        self.mode = saved_mode;
        self.output_suppressed = saved_suppressed;
        self.unset_silent = saved_silent;

        cur.set_pos(end + 1);
        val
    }

    /// Variable read, with optional postfix `++`/`--` (local variables
    /// only; the step yields the new stored value).
    fn variable_value(&mut self, cur: &mut Cursor<'_>) -> u64 {
        let Some(name) = cur.read_name() else {
            // Unreachable: the caller checked the first character.
            return 0;
        };

        if is_reserved(&name) {
            self.error(
                ErrorKind::ReadOnlyVariable,
                format!("'{name}' is a reserved word"),
            );
            return 0;
        }

        let mut val = self.read_variable(&name);
        cur.skip_whitespace();

        if cur.starts_with("++") || cur.starts_with("--") {
            if self.variables.contains(&name) {
                let stepped = if cur.peek() == Some(b'+') {
                    val.wrapping_add(1)
                } else {
                    val.wrapping_sub(1)
                };
                val = self.variables.set(&name, stepped);
                cur.advance(2);
            } else {
                // Resolver-provided name: the step is refused and the
                // operator is left for the levels above.
                self.error(
                    ErrorKind::ReadOnlyVariable,
                    format!("{name} is a read-only variable"),
                );
            }
        }

        val
    }

    // -----------------------------------------------------------------------
    // Mode-aware arithmetic
    // -----------------------------------------------------------------------

    pub(super) fn add_values(&mut self, a: u64, b: u64) -> u64 {
        match self.mode {
            ArithMode::Auto | ArithMode::Unsigned => {
                if a.checked_add(b).is_none() {
                    self.overflow_warning(true);
                }
            }
            ArithMode::Signed => {
                if (a as i64).checked_add(b as i64).is_none() {
                    self.overflow_warning((b as i64) > 0);
                }
            }
        }
        a.wrapping_add(b)
    }

    pub(super) fn sub_values(&mut self, a: u64, b: u64) -> u64 {
        match self.mode {
            ArithMode::Auto | ArithMode::Signed => {
                // Mixed signed bound checks, as the original behavior:
                // subtracting a positive can underflow, subtracting a
                // negative can overflow.
                let (ai, bi) = (a as i64, b as i64);
                if bi > 0 && ai < i64::MIN + bi {
                    self.overflow_warning(false);
                } else if bi < 0 && ai > i64::MAX + bi {
                    self.overflow_warning(true);
                }
            }
            ArithMode::Unsigned => {
                if a.checked_sub(b).is_none() {
                    self.overflow_warning(false);
                }
            }
        }
        a.wrapping_sub(b)
    }

    pub(super) fn mul_values(&mut self, a: u64, b: u64) -> u64 {
        let overflowed = match self.mode {
            ArithMode::Auto | ArithMode::Unsigned => a.checked_mul(b).is_none(),
            ArithMode::Signed => (a as i64).checked_mul(b as i64).is_none(),
        };
        if overflowed {
            self.overflow_warning(true);
        }
        a.wrapping_mul(b)
    }

    pub(super) fn div_values(&mut self, a: u64, b: u64) -> u64 {
        if b == 0 {
            self.warning(ErrorKind::DivisionByZero, "division by zero");
            return 0;
        }
        if self.mode == ArithMode::Signed {
            if a as i64 == i64::MIN && b as i64 == -1 {
                self.overflow_warning(true);
            }
            (a as i64).wrapping_div(b as i64) as u64
        } else {
            a / b
        }
    }

    pub(super) fn rem_values(&mut self, a: u64, b: u64) -> u64 {
        if b == 0 {
            self.warning(ErrorKind::ModuloByZero, "modulo by zero");
            return 0;
        }
        if self.mode == ArithMode::Signed {
            (a as i64).wrapping_rem(b as i64) as u64
        } else {
            a % b
        }
    }

    pub(super) fn shl_values(&mut self, a: u64, b: u64) -> u64 {
        self.check_shift_count(b);
        a << (b & 63)
    }

    pub(super) fn shr_values(&mut self, a: u64, b: u64) -> u64 {
        self.check_shift_count(b);
        if self.mode == ArithMode::Signed {
            ((a as i64) >> (b & 63)) as u64
        } else {
            a >> (b & 63)
        }
    }

    /// Shift counts at or above the word width warn; the shift itself
    /// uses the masked count, so `1 << 64 == 1`.
    fn check_shift_count(&mut self, count: u64) {
        if count >= 64 {
            self.warning(
                ErrorKind::ShiftOutOfRange,
                format!("shift count {count} exceeds word width (using {})", count & 63),
            );
        }
    }

    fn overflow_warning(&mut self, over: bool) {
        if over {
            self.warning(ErrorKind::Overflow, "result out of range (overflow)");
        } else {
            self.warning(ErrorKind::Underflow, "result out of range (underflow)");
        }
    }
}

/// One signed-or-unsigned relational comparison.
fn compare<T: Ord>(a: T, b: T, op: u8, or_equal: bool) -> bool {
    match (op, or_equal) {
        (b'<', false) => a < b,
        (b'<', true) => a <= b,
        (b'>', false) => a > b,
        _ => a >= b,
    }
}
