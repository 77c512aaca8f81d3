//! Integer literal reading and base formatting.
//!
//! Literals follow the C convention with a few extensions:
//!
//! | Prefix       | Base                  |
//! |--------------|-----------------------|
//! | `0x` / `0X`  | 16                    |
//! | `0b` / `0B`  | 2                     |
//! | `0t` / `0T`  | 3 (ternary)           |
//! | `0z` / `0Z`  | 36                    |
//! | `0o` / `0O`  | 8 (explicit)          |
//! | `0r` / `0R`  | Roman numerals        |
//! | bare `0`     | 8                     |
//! | other digit  | 10                    |
//!
//! A prefix only takes effect when the character after it is a valid
//! digit for the indicated base; otherwise the literal falls back to
//! plain octal starting at the `0`. Digits are case-insensitive
//! `0-9a-zA-Z`. Accumulation overflow saturates to `u64::MAX`, reports
//! a flag, and still consumes the remaining valid digits so the caller
//! resumes at a consistent position.

use crate::cursor::Cursor;

// ---------------------------------------------------------------------------
// Roman numeral table
// ---------------------------------------------------------------------------

/// One entry of the Roman numeral grammar.
///
/// Subtractive pairs (`CM`, `XC`, ...) are first-class entries; keeping
/// the table in decreasing value order makes each pair match before its
/// leading single symbol, and the non-increasing-value rule across the
/// parsed sequence then enforces subtractive-pair legality for free.
struct RomanEntry {
    symbol: &'static str,
    value: u64,
    max_rep: u32,
}

const ROMAN_TABLE: &[RomanEntry] = &[
    RomanEntry { symbol: "M", value: 1000, max_rep: 3 },
    RomanEntry { symbol: "CM", value: 900, max_rep: 1 },
    RomanEntry { symbol: "D", value: 500, max_rep: 1 },
    RomanEntry { symbol: "CD", value: 400, max_rep: 1 },
    RomanEntry { symbol: "C", value: 100, max_rep: 3 },
    RomanEntry { symbol: "XC", value: 90, max_rep: 1 },
    RomanEntry { symbol: "L", value: 50, max_rep: 1 },
    RomanEntry { symbol: "XL", value: 40, max_rep: 1 },
    RomanEntry { symbol: "X", value: 10, max_rep: 3 },
    RomanEntry { symbol: "IX", value: 9, max_rep: 1 },
    RomanEntry { symbol: "V", value: 5, max_rep: 1 },
    RomanEntry { symbol: "IV", value: 4, max_rep: 1 },
    RomanEntry { symbol: "I", value: 1, max_rep: 3 },
];

/// Whether `c` can start a Roman numeral (case-insensitive).
fn is_roman_start(c: u8) -> bool {
    matches!(c.to_ascii_uppercase(), b'I' | b'V' | b'X' | b'L' | b'C' | b'D' | b'M')
}

// ---------------------------------------------------------------------------
// Literal reader
// ---------------------------------------------------------------------------

/// Digit value of a byte under the `0-9a-zA-Z` convention, or `None`.
fn digit_value(c: u8) -> Option<u64> {
    match c {
        b'0'..=b'9' => Some(u64::from(c - b'0')),
        b'a'..=b'z' => Some(u64::from(c - b'a') + 10),
        b'A'..=b'Z' => Some(u64::from(c - b'A') + 10),
        _ => None,
    }
}

/// Read an integer literal at the cursor.
///
/// `base_hint == 0` auto-detects the base from the prefix; otherwise
/// the given base (2..=36) is used directly, skipping a matching
/// redundant prefix (`0x` for 16, etc.). Returns the value and an
/// overflow flag; on overflow the value saturates to `u64::MAX` and the
/// cursor still advances past all remaining valid digits.
///
/// A leading `+`/`-` sign is accepted; `-` two's-complement-negates the
/// accumulated magnitude. If no digits are consumed the cursor is
/// restored to where it started and `(0, false)` is returned.
pub fn read_integer(cur: &mut Cursor<'_>, base_hint: u32) -> (u64, bool) {
    if base_hint != 0 && !(2..=36).contains(&base_hint) {
        return (0, false);
    }

    let start = cur.pos();
    cur.skip_whitespace();

    let mut negate = false;
    if let Some(c @ (b'+' | b'-')) = cur.peek() {
        negate = c == b'-';
        cur.bump();
    }

    let mut base = u64::from(base_hint);
    if base == 0 {
        match detect_base(cur) {
            Detected::Radix(b) => base = b,
            Detected::Roman => {
                cur.advance(2);
                let (value, any) = read_roman(cur);
                if !any {
                    // Cannot happen: detection required a Roman start.
                    cur.set_pos(start);
                    return (0, false);
                }
                let value = if negate { value.wrapping_neg() } else { value };
                return (value, false);
            }
        }
    } else {
        skip_redundant_prefix(cur, base);
    }

    let mut result: u64 = 0;
    let mut overflow = false;
    let mut any = false;

    while let Some(c) = cur.peek() {
        let Some(d) = digit_value(c) else { break };
        if d >= base {
            break;
        }
        any = true;

        if result > u64::MAX / base || (result == u64::MAX / base && d > u64::MAX % base) {
            overflow = true;
            result = u64::MAX;
            // Consume the rest of the literal so the caller's position
            // stays consistent.
            while let Some(c) = cur.peek() {
                match digit_value(c) {
                    Some(d) if d < base => cur.bump(),
                    _ => break,
                }
            }
            break;
        }

        result = result * base + d;
        cur.bump();
    }

    if !any {
        cur.set_pos(start);
        return (0, false);
    }

    if negate {
        result = result.wrapping_neg();
    }

    (result, overflow)
}

/// Outcome of prefix auto-detection.
enum Detected {
    /// Parse digits under this base (prefix, if any, consumed).
    Radix(u64),
    /// A `0r` Roman literal (prefix not yet consumed).
    Roman,
}

/// Auto-detect the base at the cursor (which may sit on a digit).
///
/// Consumes a recognized two-character prefix; a bare leading `0` is
/// left in place and parsed as the first octal digit, exactly like the
/// C library `strtoul` convention.
fn detect_base(cur: &mut Cursor<'_>) -> Detected {
    if cur.peek() != Some(b'0') {
        return Detected::Radix(10);
    }

    let marker = cur.peek_at(1).map(|c| c.to_ascii_lowercase());
    let follow = cur.peek_at(2);

    let base = match marker {
        Some(b'x') => 16,
        Some(b'b') => 2,
        Some(b't') => 3,
        Some(b'z') => 36,
        Some(b'o') => 8,
        Some(b'r') => {
            if follow.is_some_and(is_roman_start) {
                return Detected::Roman;
            }
            return Detected::Radix(8);
        }
        _ => return Detected::Radix(8),
    };

    // The prefix only counts when followed by a valid digit for the
    // base; otherwise fall back to octal starting at the `0`.
    let valid = follow.and_then(digit_value).is_some_and(|d| d < base);
    if valid {
        cur.advance(2);
        Detected::Radix(base)
    } else {
        Detected::Radix(8)
    }
}

/// With an explicit base hint, skip a matching redundant prefix
/// (`0x10` parsed with base 16 reads as 16, not 0).
fn skip_redundant_prefix(cur: &mut Cursor<'_>, base: u64) {
    let marker = match base {
        2 => b'b',
        3 => b't',
        8 => b'o',
        16 => b'x',
        36 => b'z',
        _ => return,
    };
    if cur.peek() == Some(b'0')
        && cur.peek_at(1).map(|c| c.to_ascii_lowercase()) == Some(marker)
        && cur.peek_at(2).and_then(digit_value).is_some_and(|d| d < base)
    {
        cur.advance(2);
    }
}

/// Parse a Roman numeral at the cursor (after the `0r` prefix).
///
/// Left to right, each position tries the table entries as prefix
/// matches (case-insensitive). Parsing stops at the first unmatched
/// character, at a value increase (values must be non-increasing across
/// the sequence), or when a symbol repeats beyond its cap. Returns the
/// accumulated value and whether anything was consumed.
fn read_roman(cur: &mut Cursor<'_>) -> (u64, bool) {
    let mut total: u64 = 0;
    let mut prev_value = u64::MAX;
    let mut run_symbol: Option<&'static str> = None;
    let mut run_len: u32 = 0;
    let mut any = false;

    'outer: loop {
        for entry in ROMAN_TABLE {
            if !roman_match(cur, entry.symbol) {
                continue;
            }
            if entry.value > prev_value {
                break 'outer;
            }
            if run_symbol == Some(entry.symbol) {
                if run_len >= entry.max_rep {
                    break 'outer;
                }
                run_len += 1;
            } else {
                run_symbol = Some(entry.symbol);
                run_len = 1;
            }
            total = total.saturating_add(entry.value);
            prev_value = entry.value;
            any = true;
            cur.advance(entry.symbol.len());
            continue 'outer;
        }
        break;
    }

    (total, any)
}

/// Case-insensitive prefix match of a Roman symbol at the cursor.
fn roman_match(cur: &Cursor<'_>, symbol: &str) -> bool {
    symbol
        .bytes()
        .enumerate()
        .all(|(i, s)| cur.peek_at(i).map(|c| c.to_ascii_uppercase()) == Some(s))
}

// ---------------------------------------------------------------------------
// Display-side formatters
// ---------------------------------------------------------------------------

/// Format a value in a base between 2 and 36 (digits `0-9a-z`, no
/// prefix). Out-of-range bases fall back to decimal; that is a
/// programmer error, not a user-input condition.
#[must_use]
pub fn format_in_base(value: u64, base: u32) -> String {
    if !(2..=36).contains(&base) {
        debug_assert!(false, "base out of range: {base}");
        return value.to_string();
    }
    if value == 0 {
        return "0".to_owned();
    }

    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let base = u64::from(base);
    let mut digits = Vec::new();
    let mut rest = value;
    while rest > 0 {
        digits.push(DIGITS[(rest % base) as usize]);
        rest /= base;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Format a value as a Roman numeral.
///
/// The notation covers 1..=3999 only; anything else returns `None`.
#[must_use]
pub fn to_roman(value: u64) -> Option<String> {
    if value == 0 || value > 3999 {
        return None;
    }
    let mut out = String::new();
    let mut rest = value;
    for entry in ROMAN_TABLE {
        while rest >= entry.value {
            out.push_str(entry.symbol);
            rest -= entry.value;
        }
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
