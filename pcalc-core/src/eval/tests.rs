use super::*;
use crate::resolver::VarResolver;

/// Resolver exposing a fixed pair of read-only names.
struct FixedResolver;

impl VarResolver for FixedResolver {
    fn resolve(&self, name: &str) -> Option<u64> {
        match name {
            "answer" => Some(42),
            "zero" => Some(0),
            _ => None,
        }
    }
}

fn eval(text: &str) -> u64 {
    Session::new().evaluate(text)
}

fn eval_in(session: &mut Session, text: &str) -> u64 {
    let val = session.evaluate(text);
    session.take_errors();
    val
}

fn kinds(session: &mut Session) -> Vec<ErrorKind> {
    session.take_errors().iter().map(|e| e.kind).collect()
}

// ---------------------------------------------------------------------------
// Literals and primaries
// ---------------------------------------------------------------------------

#[test]
fn literal_bases() {
    assert_eq!(eval("42"), 42);
    assert_eq!(eval("0x10"), 16);
    assert_eq!(eval("0b101"), 5);
    assert_eq!(eval("010"), 8);
    assert_eq!(eval("0o17"), 15);
    assert_eq!(eval("0t12"), 5);
    assert_eq!(eval("0z10"), 36);
    assert_eq!(eval("0rXIV"), 14);
}

#[test]
fn char_constants() {
    assert_eq!(eval("'a'"), 0x61);
    assert_eq!(eval("'ab'"), 0x6162);
    assert_eq!(eval("'abcdefgh'"), 0x6162636465666768);
    // backslash escapes the next byte verbatim
    assert_eq!(eval(r"'\''"), 0x27);
    assert_eq!(eval(r"'\\'"), 0x5c);
}

#[test]
fn char_constant_too_long_warns() {
    let mut s = Session::new();
    let val = s.evaluate("'abcdefghij'");
    assert_eq!(val, 0x6162636465666768, "first 8 bytes kept");
    assert_eq!(kinds(&mut s), vec![ErrorKind::BadCharConstant]);
}

#[test]
fn unterminated_escape_is_an_error() {
    let mut s = Session::new();
    assert_eq!(s.evaluate(r"'\"), 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::BadCharConstant]);
}

#[test]
fn dot_is_last_result() {
    let mut s = Session::new();
    eval_in(&mut s, "6 * 7");
    assert_eq!(eval_in(&mut s, ". + 1"), 43);
    assert_eq!(eval_in(&mut s, ". * 2"), 86);
}

#[test]
fn empty_input_returns_last_result() {
    let mut s = Session::new();
    eval_in(&mut s, "9");
    assert_eq!(eval_in(&mut s, ""), 9);
    assert_eq!(eval_in(&mut s, "   "), 9);
}

// ---------------------------------------------------------------------------
// Precedence and operators
// ---------------------------------------------------------------------------

#[test]
fn precedence_cascade() {
    assert_eq!(eval("2 + 3 * 4"), 14);
    assert_eq!(eval("(2 + 3) * 4"), 20);
    assert_eq!(eval("1 << 4 + 1"), 32, "additive binds tighter than shift");
    assert_eq!(eval("1 | 2 ^ 3 & 2"), 1 | (2 ^ (3 & 2)));
    assert_eq!(eval("4 & 2 == 2"), 4 & u64::from(2 == 2));
    assert_eq!(eval("10 % 3"), 1);
    assert_eq!(eval("7 / 2"), 3);
}

#[test]
fn unary_operators() {
    assert_eq!(eval("-1"), u64::MAX);
    assert_eq!(eval("~0"), u64::MAX);
    assert_eq!(eval("!0"), 1);
    assert_eq!(eval("!5"), 0);
    assert_eq!(eval("-(2 + 3)"), 5u64.wrapping_neg());
    assert_eq!(eval("+7"), 7);
}

#[test]
fn equality_and_relational() {
    assert_eq!(eval("3 == 3"), 1);
    assert_eq!(eval("3 != 3"), 0);
    assert_eq!(eval("1 < 2"), 1);
    assert_eq!(eval("2 <= 2"), 1);
    assert_eq!(eval("2 > 2"), 0);
    assert_eq!(eval("2 >= 2"), 1);
}

#[test]
fn relationals_are_signed_by_default() {
    // -1 is all-ones; unsigned comparison would invert these.
    assert_eq!(eval("0 > -1"), 1);
    assert_eq!(eval("-2 < 1"), 1);
}

#[test]
fn logical_operators_do_not_short_circuit() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "0 && x++"), 0);
    // The right side ran anyway: x was created and stepped.
    assert_eq!(eval_in(&mut s, "x"), 1);

    assert_eq!(eval_in(&mut s, "1 || y++"), 1);
    assert_eq!(eval_in(&mut s, "y"), 1);
}

#[test]
fn logical_results_are_zero_or_one() {
    assert_eq!(eval("5 && 3"), 1);
    assert_eq!(eval("5 || 0"), 1);
    assert_eq!(eval("0 && 3"), 0);
    assert_eq!(eval("0 || 0"), 0);
}

#[test]
fn shift_operators() {
    assert_eq!(eval("1 << 4"), 16);
    assert_eq!(eval("256 >> 4"), 16);
}

#[test]
fn shift_count_is_masked_with_warning() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("1 << 64"), 1);
    assert_eq!(kinds(&mut s), vec![ErrorKind::ShiftOutOfRange]);
    assert_eq!(s.evaluate("1 << 65"), 2);
    assert_eq!(kinds(&mut s), vec![ErrorKind::ShiftOutOfRange]);
}

// ---------------------------------------------------------------------------
// Overflow and zero-division behavior
// ---------------------------------------------------------------------------

#[test]
fn unsigned_add_overflow_wraps_with_warning() {
    let mut s = Session::new();
    let val = s.evaluate("0xffffffffffffffff + 1");
    assert_eq!(val, 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::Overflow]);
}

#[test]
fn mul_overflow_wraps_with_warning() {
    let mut s = Session::new();
    let val = s.evaluate("0x8000000000000000 * 2");
    assert_eq!(val, 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::Overflow]);
}

#[test]
fn division_by_zero_yields_zero() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("5 / 0"), 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::DivisionByZero]);
    assert_eq!(s.evaluate("5 % 0"), 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::ModuloByZero]);
}

#[test]
fn literal_overflow_saturates_with_warning() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("99999999999999999999"), u64::MAX);
    assert_eq!(kinds(&mut s), vec![ErrorKind::Overflow]);
}

// ---------------------------------------------------------------------------
// Variables and assignment
// ---------------------------------------------------------------------------

#[test]
fn assignment_and_read_back() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "x = 5"), 5);
    assert_eq!(eval_in(&mut s, "x"), 5);
    assert_eq!(eval_in(&mut s, "x = x + 1"), 6);
}

#[test]
fn chained_assignment() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "a = b = c = 3"), 3);
    assert_eq!(eval_in(&mut s, "a + b + c"), 9);
}

#[test]
fn unknown_variable_reads_as_zero_with_warning() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("nope + 1"), 1);
    assert_eq!(kinds(&mut s), vec![ErrorKind::UnknownVariable]);
    // now it exists; no further warning
    assert_eq!(s.evaluate("nope"), 0);
    assert!(s.take_errors().is_empty());
}

#[test]
fn compound_assignment_operators() {
    let mut s = Session::new();
    eval_in(&mut s, "x = 10");
    assert_eq!(eval_in(&mut s, "x += 5"), 15);
    assert_eq!(eval_in(&mut s, "x -= 3"), 12);
    assert_eq!(eval_in(&mut s, "x *= 2"), 24);
    assert_eq!(eval_in(&mut s, "x /= 4"), 6);
    assert_eq!(eval_in(&mut s, "x %= 4"), 2);
    assert_eq!(eval_in(&mut s, "x <<= 3"), 16);
    assert_eq!(eval_in(&mut s, "x >>= 1"), 8);
    assert_eq!(eval_in(&mut s, "x |= 3"), 11);
    assert_eq!(eval_in(&mut s, "x &= 9"), 9);
    assert_eq!(eval_in(&mut s, "x ^= 1"), 8);
}

#[test]
fn compound_assignment_creates_missing_target() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "fresh += 7"), 7);
    assert_eq!(eval_in(&mut s, "fresh"), 7);
}

#[test]
fn increment_and_decrement() {
    let mut s = Session::new();
    eval_in(&mut s, "x = 5");
    // both forms yield the new stored value
    assert_eq!(eval_in(&mut s, "++x"), 6);
    assert_eq!(eval_in(&mut s, "x++"), 7);
    assert_eq!(eval_in(&mut s, "--x"), 6);
    assert_eq!(eval_in(&mut s, "x--"), 5);
    assert_eq!(eval_in(&mut s, "x"), 5);
}

#[test]
fn increment_of_literal_is_an_error() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("++5"), 5);
    assert_eq!(kinds(&mut s), vec![ErrorKind::BadExpression]);
}

#[test]
fn non_identifier_assignment_target_is_diagnosed() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("5 = 3"), 5);
    assert_eq!(kinds(&mut s), vec![ErrorKind::NotAssignable]);
    assert_eq!(s.evaluate("a + b = 3"), 0);
    assert!(kinds(&mut s).contains(&ErrorKind::NotAssignable));
}

// ---------------------------------------------------------------------------
// Unset
// ---------------------------------------------------------------------------

#[test]
fn unset_removes_and_notes() {
    let mut s = Session::new();
    eval_in(&mut s, "x = 5");
    s.evaluate("x=");
    assert!(s.output_suppressed());
    let errors = s.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity, Severity::Info);
    assert_eq!(errors[0].message, "Variable 'x' unset");
    assert!(!s.variables().contains("x"));
}

#[test]
fn unset_with_semicolon_is_silent() {
    let mut s = Session::new();
    eval_in(&mut s, "x = 5");
    s.evaluate("x=;");
    assert!(s.output_suppressed());
    assert!(s.take_errors().is_empty());
    assert!(!s.variables().contains("x"));
}

#[test]
fn unset_of_absent_variable_is_quiet() {
    let mut s = Session::new();
    s.evaluate("ghost=");
    assert!(s.take_errors().is_empty());
}

#[test]
fn unset_chain_removes_every_link() {
    let mut s = Session::new();
    eval_in(&mut s, "a = b = 2");
    s.evaluate("a=b=");
    assert!(!s.variables().contains("a"));
    assert!(!s.variables().contains("b"));
    let notes = s.take_errors();
    assert_eq!(notes.len(), 2);
}

#[test]
fn register_cannot_be_unset() {
    let mut s = Session::new();
    eval_in(&mut s, "r8 = 7");
    s.evaluate("r8=");
    assert_eq!(kinds(&mut s), vec![ErrorKind::RegisterUnset]);
    assert_eq!(s.variables().lookup("r8"), Some(7));
}

// ---------------------------------------------------------------------------
// Statements and suppression
// ---------------------------------------------------------------------------

#[test]
fn semicolon_separates_statements() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "x = 2; y = 3; x * y"), 6);
    assert_eq!(s.last_result(), 6);
}

#[test]
fn trailing_semicolon_suppresses_output() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("x = 5;"), 5);
    assert!(s.output_suppressed());
    assert_eq!(s.evaluate("x"), 5);
    assert!(!s.output_suppressed());
}

#[test]
fn suppression_does_not_leak_out_of_groupings() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("(x = 5;) + 1"), 6);
    assert!(!s.output_suppressed());
}

#[test]
fn statements_inside_grouping_update_last_result() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "(2; 3) + 0"), 3);
}

// ---------------------------------------------------------------------------
// Groupings and modes
// ---------------------------------------------------------------------------

#[test]
fn grouping_kinds_nest() {
    assert_eq!(eval("((2 + 3))"), 5);
    assert_eq!(eval("{2 + 3}"), 5);
    assert_eq!(eval("[2 + 3]"), 5);
    assert_eq!(eval("(1 + {2 + [3]})"), 6);
}

#[test]
fn mismatched_grouping_is_an_error() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("(2 + 3"), 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::MismatchedGrouping]);
}

#[test]
fn brackets_force_signed_comparison() {
    let mut s = Session::new();
    s.set_mode(ArithMode::Unsigned);
    // unsigned: all-ones is huge
    assert_eq!(eval_in(&mut s, "0 > -1"), 0);
    // signed grouping overrides for its extent only
    assert_eq!(eval_in(&mut s, "[0 > -1]"), 1);
    assert_eq!(s.mode(), ArithMode::Unsigned);
}

#[test]
fn braces_force_unsigned_comparison() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "0 > -1"), 1);
    assert_eq!(eval_in(&mut s, "{0 > -1}"), 0);
    assert_eq!(s.mode(), ArithMode::Auto);
}

#[test]
fn mode_restored_after_mismatched_inner_grouping() {
    let mut s = Session::new();
    s.evaluate("{ (1 + 2 }");
    s.take_errors();
    assert_eq!(s.mode(), ArithMode::Auto);
}

#[test]
fn signed_mode_arithmetic() {
    let mut s = Session::new();
    s.set_mode(ArithMode::Signed);
    assert_eq!(eval_in(&mut s, "-6 / 2"), 3u64.wrapping_neg());
    assert_eq!(eval_in(&mut s, "-7 % 3"), 1u64.wrapping_neg());
    // i64::MIN / -1 overflows; wrapped result, warning
    let val = s.evaluate("0x8000000000000000 / -1");
    assert_eq!(val, 0x8000000000000000);
    assert_eq!(kinds(&mut s), vec![ErrorKind::Overflow]);
}

#[test]
fn unsigned_mode_underflow() {
    let mut s = Session::new();
    s.set_mode(ArithMode::Unsigned);
    let val = s.evaluate("0 - 1");
    assert_eq!(val, u64::MAX);
    assert_eq!(kinds(&mut s), vec![ErrorKind::Underflow]);
}

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

#[test]
fn register_stores_are_masked() {
    let mut s = Session::new();
    assert_eq!(eval_in(&mut s, "r8 = 0x1ff"), 0xff);
    assert_eq!(eval_in(&mut s, "r16 = 0x12345"), 0x2345);
    assert_eq!(eval_in(&mut s, "r32 = -1"), 0xffff_ffff);
    assert_eq!(eval_in(&mut s, "r64 = -1"), u64::MAX);
}

#[test]
fn register_masked_through_compound_and_step() {
    let mut s = Session::new();
    eval_in(&mut s, "r8 = 0xff");
    assert_eq!(eval_in(&mut s, "r8 += 1"), 0);
    assert_eq!(eval_in(&mut s, "r8 = 0xff"), 0xff);
    assert_eq!(eval_in(&mut s, "r8++"), 0);
    assert_eq!(eval_in(&mut s, "r8 = 0; --r8"), 0xff);
}

// ---------------------------------------------------------------------------
// Reserved words and read-only names
// ---------------------------------------------------------------------------

#[test]
fn reserved_words_are_not_variables() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("quit"), 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::ReadOnlyVariable]);
    assert_eq!(s.evaluate("vars = 1"), 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::ReadOnlyVariable]);
    s.evaluate("help=");
    assert_eq!(kinds(&mut s), vec![ErrorKind::ReadOnlyVariable]);
}

#[test]
fn resolver_names_read_but_do_not_write() {
    let mut s = Session::with_resolver(Box::new(FixedResolver));
    assert_eq!(eval_in(&mut s, "answer"), 42);
    assert_eq!(eval_in(&mut s, "answer + 1"), 43);

    assert_eq!(s.evaluate("answer = 1"), 0);
    assert_eq!(kinds(&mut s), vec![ErrorKind::ReadOnlyVariable]);

    s.evaluate("answer=");
    assert_eq!(kinds(&mut s), vec![ErrorKind::ReadOnlyVariable]);

    assert_eq!(s.evaluate("answer++"), 42);
    assert!(kinds(&mut s).contains(&ErrorKind::ReadOnlyVariable));
}

#[test]
fn refused_assignment_leaves_no_local_shadow() {
    let mut s = Session::with_resolver(Box::new(FixedResolver));
    eval_in(&mut s, "answer = 7");
    assert_eq!(eval_in(&mut s, "answer"), 42);
    assert!(!s.variables().contains("answer"));
}

// ---------------------------------------------------------------------------
// Error recovery
// ---------------------------------------------------------------------------

#[test]
fn unknown_operator_stops_the_parse() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("5 ? 3"), 5);
    assert_eq!(kinds(&mut s), vec![ErrorKind::UnknownOperator]);
}

#[test]
fn garbage_primary_is_diagnosed() {
    let mut s = Session::new();
    assert_eq!(s.evaluate("@"), 0);
    // the primary error, then the parse-stopped diagnostic on the
    // unconsumed character
    let kinds = kinds(&mut s);
    assert!(kinds.contains(&ErrorKind::BadExpression), "{kinds:?}");
}

#[test]
fn deep_nesting_is_a_diagnostic_not_a_crash() {
    let mut s = Session::new();
    let depth = 300;
    let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let val = s.evaluate(&text);
    assert_eq!(val, 0);
    assert!(kinds(&mut s).contains(&ErrorKind::RecursionLimit));
}

#[test]
fn evaluate_expression_returns_diagnostics() {
    let mut s = Session::new();
    let (val, errors) = s.evaluate_expression("1 / 0");
    assert_eq!(val, 0);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::DivisionByZero);
    assert!(s.take_errors().is_empty(), "drained by evaluate_expression");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

mod properties {
    use super::*;
    use crate::number::format_in_base;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn literal_round_trip(value: u64) {
            for (base, prefix) in [(2, "0b"), (3, "0t"), (8, "0o"), (10, ""), (16, "0x"), (36, "0z")] {
                let text = format!("{prefix}{}", format_in_base(value, base));
                prop_assert_eq!(eval(&text), value, "base {}", base);
            }
        }

        #[test]
        fn evaluator_total_on_arbitrary_ascii(text in "[ -~]{0,40}") {
            // Never panics, whatever the input.
            let mut s = Session::new();
            let _ = s.evaluate(&text);
            let _ = s.take_errors();
        }

        #[test]
        fn addition_matches_wrapping_semantics(a: u64, b: u64) {
            let mut s = Session::new();
            let val = s.evaluate(&format!("{a} + {b}"));
            prop_assert_eq!(val, a.wrapping_add(b));
        }
    }
}
