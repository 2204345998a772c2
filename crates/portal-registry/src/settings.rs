use crate::error::{RegistryError, Result};
use jiff::SignedDuration;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Links expire one day after creation unless configured otherwise.
pub const DEFAULT_TTL: SignedDuration = SignedDuration::from_secs(86_400);
pub const DEFAULT_VISIT_LIMIT: u32 = 100;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Configures a [`LinkRegistry`](crate::LinkRegistry) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct RegistrySettings {
    /// How long a link lives after creation, regardless of visits.
    #[builder(default = DEFAULT_TTL)]
    pub ttl: SignedDuration,
    /// Visit limit applied when the caller does not pick one.
    #[builder(default = DEFAULT_VISIT_LIMIT)]
    pub default_visit_limit: u32,
    /// Period of the background sweep. `None` disables the background task;
    /// [`LinkRegistry::sweep_expired`](crate::LinkRegistry::sweep_expired)
    /// still works.
    #[builder(default = Some(DEFAULT_SWEEP_INTERVAL))]
    pub sweep_interval: Option<Duration>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RegistrySettings {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.ttl.is_negative() {
            return Err(RegistryError::InvalidSettings(format!(
                "ttl must not be negative, got {}",
                self.ttl
            )));
        }

        if self.sweep_interval.is_some_and(|every| every.is_zero()) {
            return Err(RegistryError::InvalidSettings(
                "sweep interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
