//! Result rendering.
//!
//! A value prints as a main line and an alternate-representations
//! line. The main line is deliberately frugal with digits: values that
//! fit in 32 bits (as unsigned, or as a sign-extended `i32`) use the
//! short hexadecimal form. The signed rendition appears only when the
//! value is negative as an `i64`, and the packed-character column only
//! when at least one byte is printable ASCII.

use pcalc_core::number::{format_in_base, to_roman};

/// Print a result to stdout, both lines.
pub fn print_result(value: u64) {
    println!("{}", format_result(value));
    println!("{}", format_alt_bases(value));
}

/// The main result line: padded decimal, hex, optional signed
/// rendition, optional packed characters.
pub fn format_result(value: u64) -> String {
    let signed = value as i64;
    let short = (value <= 0xffff_ffff && signed >= 0)
        || (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&signed);

    let dec = format!("{value:20}");
    let hex = if short {
        format!("0x{value:08x}")
    } else {
        format!("0x{value:016x}")
    };

    let bytes = value.to_be_bytes();
    let has_printable = bytes.iter().any(|b| is_printable(*b));

    let mut out = if has_printable {
        format!("{dec}  {hex:<18}")
    } else {
        format!("{dec}  {hex}")
    };

    if signed < 0 {
        out.push_str(&format!("  sign: {signed:20}"));
    }

    if has_printable {
        out.push_str("  char: ");
        for b in bytes {
            out.push(if is_printable(b) { char::from(b) } else { '.' });
        }
    }

    out
}

/// The alternate-representations line: octal, binary, ternary,
/// base 36, and Roman when the value is in Roman range.
pub fn format_alt_bases(value: u64) -> String {
    let mut out = format!(
        "  oct: 0o{}  bin: 0b{}  ter: 0t{}  b36: 0z{}",
        format_in_base(value, 8),
        format_in_base(value, 2),
        format_in_base(value, 3),
        format_in_base(value, 36),
    );
    if let Some(roman) = to_roman(value) {
        out.push_str("  roman: 0r");
        out.push_str(&roman);
    }
    out
}

const fn is_printable(b: u8) -> bool {
    b >= 0x20 && b <= 0x7e
}
