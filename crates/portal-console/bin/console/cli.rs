use anyhow::Context;
use clap::Parser;
use portal_registry::settings::{DEFAULT_TTL, DEFAULT_VISIT_LIMIT};
use portal_registry::RegistrySettings;
use std::time::Duration;

pub const EXPIRATION_SECONDS_ENV: &str = "PORTAL_EXPIRATION_SECONDS";
pub const DEFAULT_VISIT_LIMIT_ENV: &str = "PORTAL_DEFAULT_VISIT_LIMIT";
pub const SWEEP_INTERVAL_SECONDS_ENV: &str = "PORTAL_SWEEP_INTERVAL_SECONDS";
pub const OWNER_ID_ENV: &str = "PORTAL_OWNER_ID";
pub const BASE_URL_ENV: &str = "PORTAL_BASE_URL";

pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 3_600;

#[derive(Debug, Parser)]
#[command(name = "portal", about = "Interactive in-memory link shortener")]
pub struct CLI {
    /// Seconds a link lives after creation.
    #[arg(long, env = EXPIRATION_SECONDS_ENV, default_value_t = DEFAULT_TTL.as_secs() as u64)]
    pub expiration_seconds: u64,

    /// Visit limit for links created without an explicit one.
    #[arg(long, env = DEFAULT_VISIT_LIMIT_ENV, default_value_t = DEFAULT_VISIT_LIMIT)]
    pub default_visit_limit: u32,

    /// Seconds between background sweeps of dead links; 0 disables the sweep.
    #[arg(
        long,
        env = SWEEP_INTERVAL_SECONDS_ENV,
        default_value_t = DEFAULT_SWEEP_INTERVAL_SECONDS
    )]
    pub sweep_interval_seconds: u64,

    /// Identifier owning the links of this session. A random UUID when unset.
    #[arg(long, env = OWNER_ID_ENV)]
    pub owner_id: Option<String>,

    /// Public prefix used to display short links, e.g. `https://por.tal`.
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,
}

impl CLI {
    pub fn registry_settings(&self) -> anyhow::Result<RegistrySettings> {
        let ttl_seconds = i64::try_from(self.expiration_seconds)
            .context("expiration seconds is out of range")?;
        let sweep_interval = (self.sweep_interval_seconds > 0)
            .then(|| Duration::from_secs(self.sweep_interval_seconds));

        Ok(RegistrySettings::builder()
            .ttl(jiff::SignedDuration::from_secs(ttl_seconds))
            .default_visit_limit(self.default_visit_limit)
            .sweep_interval(sweep_interval)
            .build())
    }
}
