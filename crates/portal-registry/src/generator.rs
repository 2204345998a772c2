pub mod random;
pub mod seq;

use portal_core::ShortToken;

pub use random::{RandomGenerator, TOKEN_ALPHABET, TOKEN_LENGTH};
pub use seq::SeqGenerator;

/// Trait for generating short tokens.
///
/// Implementations are pure generators that don't interact with storage;
/// the registry retries when a generated token is already taken.
pub trait Generator: Send + Sync + 'static {
    /// Generates a short token that is unique with overwhelming probability.
    fn generate(&self) -> ShortToken;
}
