use crate::generator::Generator;
use portal_core::ShortToken;
use std::iter;

/// Number of characters in a generated token.
pub const TOKEN_LENGTH: usize = 8;

/// The URL-safe alphabet tokens are drawn from (64 symbols).
pub const TOKEN_ALPHABET: &[u8; 64] =
    b"_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates random 8-character tokens from [`TOKEN_ALPHABET`] using the
/// thread-local RNG.
///
/// 64^8 possible tokens make a collision between two live links unlikely,
/// but not impossible; the registry handles the rare repeat.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortToken {
        let token: String =
            iter::repeat_with(|| TOKEN_ALPHABET[rand::random_range(0..TOKEN_ALPHABET.len())] as char)
                .take(TOKEN_LENGTH)
                .collect();
        ShortToken::new_unchecked(token)
    }
}
