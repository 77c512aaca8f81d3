//! Variable storage: user variables and fixed-width registers.
//!
//! All values are 64-bit words. Registers are pre-seeded variables with
//! a width in bits; every store through [`Variables::set`] truncates to
//! the register's width, so a register can never hold a value wider
//! than itself. Registers cannot be removed. Reserved words are the
//! interactive keywords; the evaluator refuses to read or assign them.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Reserved words and registers
// ---------------------------------------------------------------------------

/// Interactive keywords. Never readable, never assignable.
pub const RESERVED: &[&str] = &[
    "auto", "help", "mode", "quit", "regs", "signed", "take", "unsigned", "vars",
];

/// A fixed-width register.
#[derive(Debug, Clone, Copy)]
pub struct RegisterSpec {
    /// Register name.
    pub name: &'static str,
    /// Width in bits (1..=64).
    pub bits: u32,
}

impl RegisterSpec {
    /// Bit mask covering the register's width.
    #[must_use]
    pub const fn mask(&self) -> u64 {
        if self.bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }
}

/// The register set. `rtime` is seeded by the host with the session
/// start time.
pub const REGISTERS: &[RegisterSpec] = &[
    RegisterSpec { name: "r8", bits: 8 },
    RegisterSpec { name: "r16", bits: 16 },
    RegisterSpec { name: "r32", bits: 32 },
    RegisterSpec { name: "r64", bits: 64 },
    RegisterSpec { name: "rtime", bits: 64 },
];

/// Whether `name` is an interactive keyword.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// The register spec for `name`, if it is a register.
#[must_use]
pub fn register_spec(name: &str) -> Option<&'static RegisterSpec> {
    REGISTERS.iter().find(|r| r.name == name)
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Session variable table.
///
/// Registers are present from construction; everything else appears on
/// first assignment (or on first read, when the evaluator auto-creates
/// an unknown name at zero).
#[derive(Debug)]
pub struct Variables {
    values: HashMap<String, u64>,
}

impl Variables {
    /// Create a table with all registers present at zero.
    #[must_use]
    pub fn new() -> Self {
        let values = REGISTERS.iter().map(|r| (r.name.to_owned(), 0)).collect();
        Self { values }
    }

    /// Look up a variable.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Whether the variable exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Store a value, truncating to the register width when the name is
    /// a register. Returns the value actually stored.
    pub fn set(&mut self, name: &str, value: u64) -> u64 {
        let stored = self.truncate(name, value);
        self.values.insert(name.to_owned(), stored);
        stored
    }

    /// Truncate `value` as a store to `name` would (identity for
    /// non-registers).
    #[must_use]
    pub fn truncate(&self, name: &str, value: u64) -> u64 {
        register_spec(name).map_or(value, |r| value & r.mask())
    }

    /// Remove a variable. Registers cannot be removed; returns whether
    /// anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        if register_spec(name).is_some() {
            return false;
        }
        self.values.remove(name).is_some()
    }

    /// User variables (registers excluded), sorted by name.
    #[must_use]
    pub fn user_vars(&self) -> Vec<(&str, u64)> {
        let mut vars: Vec<_> = self
            .values
            .iter()
            .filter(|(name, _)| register_spec(name).is_none())
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        vars.sort_by_key(|(name, _)| *name);
        vars
    }

    /// All registers with their current values, in declaration order.
    #[must_use]
    pub fn registers(&self) -> Vec<(&'static RegisterSpec, u64)> {
        REGISTERS
            .iter()
            .map(|spec| (spec, self.lookup(spec.name).unwrap_or(0)))
            .collect()
    }
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_seeded_at_zero() {
        let vars = Variables::new();
        for spec in REGISTERS {
            assert_eq!(vars.lookup(spec.name), Some(0), "{}", spec.name);
        }
    }

    #[test]
    fn set_and_lookup() {
        let mut vars = Variables::new();
        assert_eq!(vars.set("x", 42), 42);
        assert_eq!(vars.lookup("x"), Some(42));
        assert_eq!(vars.lookup("y"), None);
    }

    #[test]
    fn register_store_truncates() {
        let mut vars = Variables::new();
        assert_eq!(vars.set("r8", 0x1ff), 0xff);
        assert_eq!(vars.lookup("r8"), Some(0xff));
        assert_eq!(vars.set("r16", 0x1_2345), 0x2345);
        assert_eq!(vars.set("r32", u64::MAX), 0xffff_ffff);
        assert_eq!(vars.set("r64", u64::MAX), u64::MAX);
    }

    #[test]
    fn registers_cannot_be_removed() {
        let mut vars = Variables::new();
        vars.set("r8", 7);
        assert!(!vars.remove("r8"));
        assert_eq!(vars.lookup("r8"), Some(7));
    }

    #[test]
    fn remove_reports_existence() {
        let mut vars = Variables::new();
        vars.set("x", 1);
        assert!(vars.remove("x"));
        assert!(!vars.remove("x"));
    }

    #[test]
    fn user_vars_sorted_without_registers() {
        let mut vars = Variables::new();
        vars.set("zeta", 3);
        vars.set("alpha", 1);
        vars.set("r8", 9);
        let listed = vars.user_vars();
        assert_eq!(listed, vec![("alpha", 1), ("zeta", 3)]);
    }

    #[test]
    fn reserved_words() {
        assert!(is_reserved("quit"));
        assert!(is_reserved("vars"));
        assert!(!is_reserved("r8"));
        assert!(!is_reserved("x"));
    }

    #[test]
    fn register_masks() {
        assert_eq!(register_spec("r8").map(RegisterSpec::mask), Some(0xff));
        assert_eq!(register_spec("r64").map(RegisterSpec::mask), Some(u64::MAX));
        assert!(register_spec("x").is_none());
    }
}
