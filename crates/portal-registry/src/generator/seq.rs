use crate::generator::Generator;
use portal_core::ShortToken;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic token generator using a sequential counter.
///
/// Produces codes like "pt000000", "pt000001", etc. Useful for tests and
/// reproducible sessions; tokens are predictable, so prefer
/// [`RandomGenerator`](crate::generator::RandomGenerator) for anything shared.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    ///
    /// The prefix must only use URL-safe characters.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            counter: AtomicU64::new(0),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> ShortToken {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortToken::new_unchecked(format!("{}{:06}", self.prefix, count))
    }
}
