//! Identity tokens for graph members
//!
//! A token is unique within one document and is how a parent's children
//! list refers to other records in the flat encoded form.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity token for a node or singleton record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(String);

impl Token {
    /// Wrap an existing token value (e.g. read back from a record).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh token, unique within the process.
    ///
    /// The nanosecond component keeps tokens from two runs of the same
    /// editor session from colliding when documents are merged.
    pub fn generate() -> Self {
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() as u64)
            .unwrap_or(0);
        Self(format!("{:08x}-{:08x}", nanos, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Token> for String {
    fn from(value: Token) -> Self {
        value.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = Token::generate();
        let b = Token::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_roundtrip() {
        let t = Token::new("abc123");
        assert_eq!(t.as_str(), "abc123");
        assert_eq!(t.to_string(), "abc123");
    }
}
