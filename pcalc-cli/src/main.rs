//! `pcalc` CLI — evaluate C-style integer expressions.
//!
//! With arguments, the arguments are joined into one expression and
//! evaluated. Without arguments, a herald is printed and lines are read
//! from stdin until `quit` or end of input. A handful of keywords are
//! handled here rather than by the evaluator: `vars`, `regs`, `help`,
//! `mode`, `take`, `quit`.

use std::fs;
use std::io::{self, BufRead};

use chrono::DateTime;
use clap::Parser;

use pcalc_core::error::Severity;
use pcalc_core::eval::{ArithMode, Session};
use pcalc_core::resolver::VarResolver;

mod builtins;
mod display;

use builtins::Builtins;

#[derive(Parser)]
#[command(version, about = "pcalc \u{2014} a programmer's calculator")]
struct Cli {
    /// Expression to evaluate; reads stdin when absent
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    expr: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let mut session = Session::with_resolver(Box::new(Builtins));
    // rtime starts as the session start time.
    session.variables_mut().set("rtime", builtins::unix_time());

    if !cli.expr.is_empty() {
        let line = cli.expr.join(" ");
        run_line(&mut session, &line);
        return;
    }

    println!("pcalc {} ready.", env!("CARGO_PKG_VERSION"));
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if !run_line(&mut session, &line) {
            break;
        }
    }
}

/// Handle one input line: a session keyword or an expression.
/// Returns `false` when the session should end.
fn run_line(session: &mut Session, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return true;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "quit" if rest.is_empty() => return false,
        "vars" if rest.is_empty() => {
            list_user_vars(session);
            return true;
        }
        "regs" if rest.is_empty() => {
            list_registers(session);
            return true;
        }
        "help" if rest.is_empty() => {
            print_help();
            return true;
        }
        "mode" => {
            handle_mode(session, rest);
            return true;
        }
        "take" if !rest.is_empty() => {
            return take_file(session, rest);
        }
        _ => {}
    }

    let value = session.evaluate(line);
    print_diagnostics(session);
    if !session.output_suppressed() {
        display::print_result(value);
    }
    true
}

fn print_diagnostics(session: &mut Session) {
    for err in session.take_errors() {
        match err.severity {
            Severity::Info => println!("{}", err.message),
            Severity::Warning => eprintln!("Warning: {}", err.message),
            Severity::Error => eprintln!("Error: {}", err.message),
        }
    }
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

fn list_user_vars(session: &Session) {
    let vars = session.variables().user_vars();
    if vars.is_empty() {
        println!("No user variables defined.");
        return;
    }
    println!("User variables:");
    for (name, value) in vars {
        println!("  {name:<16} = {}", display::format_result(value));
    }
}

fn list_registers(session: &Session) {
    println!("Registers:");
    for (spec, value) in session.variables().registers() {
        if spec.name == "rtime" {
            println!(
                "  {:<16} = {}  ({})",
                spec.name,
                display::format_result(value),
                format_clock(value)
            );
        } else {
            println!(
                "  {:<16} = {}  ({}-bit)",
                spec.name,
                display::format_result(value),
                spec.bits
            );
        }
    }
}

fn format_clock(secs: u64) -> String {
    DateTime::from_timestamp(secs as i64, 0).map_or_else(
        || "out of clock range".to_owned(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

fn handle_mode(session: &mut Session, rest: &str) {
    match rest {
        "" => println!("mode: {}", session.mode().name()),
        "auto" => session.set_mode(ArithMode::Auto),
        "signed" => session.set_mode(ArithMode::Signed),
        "unsigned" => session.set_mode(ArithMode::Unsigned),
        other => {
            eprintln!("Error: unknown mode '{other}' (expected auto, signed or unsigned)");
        }
    }
}

/// Evaluate a script file line by line. Empty lines and `#` comments
/// are skipped; a `quit` inside the script ends the whole session.
fn take_file(session: &mut Session, path: &str) -> bool {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error: can't read {path}: {e}");
            return true;
        }
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !run_line(session, line) {
            return false;
        }
    }
    true
}

fn print_help() {
    println!("Enter a C-style integer expression, or one of:");
    println!("  vars             list user variables");
    println!("  regs             list registers (r8 r16 r32 r64 rtime)");
    println!("  mode [M]         show or set arithmetic mode (auto, signed, unsigned)");
    println!("  take FILE        evaluate FILE line by line");
    println!("  quit             leave");
    println!();
    println!("Literals: decimal, 0x hex, 0o/leading-0 octal, 0b binary,");
    println!("0t ternary, 0z base 36, 0r Roman, 'c' character constants.");
    println!("'.' is the last result; a trailing ';' suppresses output.");
    println!("{{...}} evaluates unsigned, [...] evaluates signed.");
    println!();
    println!("The following builtin variables are defined:");
    for name in Builtins::NAMES {
        if let Some(value) = Builtins.resolve(name) {
            println!("  {name:<16} = {}", display::format_result(value));
        }
    }
}
