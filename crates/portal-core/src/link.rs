use crate::token::ShortToken;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// A shortened link held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// The generated key of this link.
    pub short_token: ShortToken,
    /// Opaque identifier of the session that created the link.
    pub owner_id: String,
    /// How many successful redirects the link allows.
    pub visit_limit: u32,
    /// When the link was created, according to the registry clock.
    pub created_at: Timestamp,
    /// How many successful redirects have happened so far.
    pub visit_count: u32,
}

impl LinkRecord {
    /// Builds a fresh record with no visits.
    pub fn new(
        original_url: impl Into<String>,
        short_token: ShortToken,
        owner_id: impl Into<String>,
        visit_limit: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            short_token,
            owner_id: owner_id.into(),
            visit_limit,
            created_at,
            visit_count: 0,
        }
    }

    /// The instant the link stops resolving, or `None` if `created_at + ttl`
    /// is past the representable range.
    pub fn expires_at(&self, ttl: SignedDuration) -> Option<Timestamp> {
        self.created_at.checked_add(ttl).ok()
    }

    pub fn is_expired(&self, now: Timestamp, ttl: SignedDuration) -> bool {
        self.expires_at(ttl).is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.visit_count >= self.visit_limit
    }

    /// A link is live while it is neither expired nor out of visits.
    pub fn is_live(&self, now: Timestamp, ttl: SignedDuration) -> bool {
        !self.is_expired(now, ttl) && !self.is_exhausted()
    }

    pub fn remaining_visits(&self) -> u32 {
        self.visit_limit.saturating_sub(self.visit_count)
    }

    pub fn is_owned_by(&self, caller_id: &str) -> bool {
        self.owner_id == caller_id
    }
}
