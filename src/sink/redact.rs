// src/sink/redact.rs
//! Redaction of the bomb generation diagnostic.
//!
//! The game prints the generated bomb's details at the start of a round.
//! Forwarding that line would spoil a competitive round, so its arguments are
//! swapped for a fixed placeholder before it reaches the real sink.

use crate::record::Arg;
use std::borrow::Cow;

/// Prefix of the diagnostic line that gets redacted.
pub const DEFAULT_SENTINEL: &str = "[BombGenerator] Generating bomb with seed";

/// Text forwarded in place of the diagnostic's arguments.
pub const DEFAULT_PLACEHOLDER: &str = "[CompetitiveLogger] Bomb generation details redacted.";

/// A single sentinel-prefix redaction rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redactor {
    sentinel: String,
    placeholder: String,
}

impl Redactor {
    pub fn new(sentinel: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Whether a formatted call with these arguments must be redacted.
    pub fn matches(&self, args: &[Arg]) -> bool {
        args.first()
            .and_then(Arg::as_str)
            .is_some_and(|first| first.starts_with(&self.sentinel))
    }

    /// The argument list to forward: either `args` untouched or the placeholder alone.
    pub fn apply<'a>(&self, args: &'a [Arg]) -> Cow<'a, [Arg]> {
        if self.matches(args) {
            Cow::Owned(vec![Arg::Str(self.placeholder.clone())])
        } else {
            Cow::Borrowed(args)
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL, DEFAULT_PLACEHOLDER)
    }
}
