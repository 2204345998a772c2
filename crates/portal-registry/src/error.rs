use thiserror::Error;

/// Result type for registry construction.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors surfaced while building a [`LinkRegistry`](crate::LinkRegistry).
///
/// Once constructed, registry operations report absence and authorization
/// failures through `Option`/`bool` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid registry settings: {0}")]
    InvalidSettings(String),
    #[error("background sweep could not be scheduled: {0}")]
    SchedulerUnavailable(String),
}
