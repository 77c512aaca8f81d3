//! Host-provided read-only names.
//!
//! The host (typically the CLI) can expose a set of built-in constants
//! to the evaluator: platform limits, the process id, the current time,
//! and so on. The evaluator treats any name the resolver knows as
//! read-only; assigning or unsetting one is an error.

/// Source of read-only variable values.
pub trait VarResolver {
    /// The value of `name`, or `None` when the resolver does not
    /// provide it.
    fn resolve(&self, name: &str) -> Option<u64>;
}

/// A resolver that provides nothing. Used by sessions without a host
/// environment, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl VarResolver for NullResolver {
    fn resolve(&self, _name: &str) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_resolver_resolves_nothing() {
        assert_eq!(NullResolver.resolve("pid"), None);
    }
}
