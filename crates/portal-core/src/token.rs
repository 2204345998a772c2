use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The identifier of a shortened link, used as the registry key and as the
/// public redirect path.
///
/// Tokens are 3-32 characters drawn from the URL-safe alphabet
/// `[A-Za-z0-9_-]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortToken(String);

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 32;

impl ShortToken {
    /// Creates a new `ShortToken` after validating the input.
    pub fn new(token: impl Into<String>) -> std::result::Result<Self, CoreError> {
        let token = token.into();
        Self::validate(&token)?;
        Ok(Self(token))
    }

    /// Creates a `ShortToken` without validation.
    ///
    /// Use this only for tokens produced by generators that are guaranteed
    /// to emit valid output.
    pub fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Renders the public redirect URL for this token under `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `c` belongs to the URL-safe token alphabet.
    pub fn is_token_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    }

    fn validate(token: &str) -> std::result::Result<(), CoreError> {
        if token.len() < MIN_LENGTH || token.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortToken(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                token.len()
            )));
        }

        if !token.chars().all(Self::is_token_char) {
            return Err(CoreError::InvalidShortToken(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                token
            )));
        }

        Ok(())
    }
}

impl TryFrom<String> for ShortToken {
    type Error = CoreError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortToken> for String {
    fn from(value: ShortToken) -> Self {
        value.0
    }
}

impl Display for ShortToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
