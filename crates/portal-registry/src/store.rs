use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use portal_core::{LinkRecord, ShortToken};

/// Why a dead record was removed while being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eviction {
    /// `now >= created_at + ttl`.
    Expired,
    /// `visit_count >= visit_limit`.
    Exhausted,
}

/// Outcome of a keyed store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    /// The record was live and the operation ran against it.
    Found(T),
    /// The record was dead and has been removed.
    Evicted(Eviction),
    /// No record under this token.
    Missing,
}

impl<T> Access<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Access::Found(value) => Some(value),
            Access::Evicted(_) | Access::Missing => None,
        }
    }
}

/// A successful visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub original_url: String,
    pub visit_count: u32,
    /// This visit used up the quota and the record is gone.
    pub last: bool,
}

/// In-memory link storage using DashMap.
///
/// Every compound operation (read, decide, then mutate or evict) runs while
/// holding the entry guard of its key, so it is atomic with respect to other
/// operations on the same token. DashMap shards its locks, so operations on
/// tokens in other shards proceed concurrently.
#[derive(Debug)]
pub struct LinkStore {
    links: DashMap<ShortToken, LinkRecord>,
    ttl: SignedDuration,
}

impl LinkStore {
    /// Creates an empty store whose records live for `ttl` after creation.
    pub fn new(ttl: SignedDuration) -> Self {
        Self {
            links: DashMap::new(),
            ttl,
        }
    }

    fn eviction(&self, link: &LinkRecord, now: Timestamp) -> Option<Eviction> {
        if link.is_expired(now, self.ttl) {
            Some(Eviction::Expired)
        } else if link.is_exhausted() {
            Some(Eviction::Exhausted)
        } else {
            None
        }
    }

    /// Stores `record` under its token unless a live record already holds it.
    ///
    /// A dead record under the same token is overwritten. On conflict the
    /// record is handed back so the caller can retry with another token.
    pub fn insert_new(&self, record: LinkRecord, now: Timestamp) -> Result<(), LinkRecord> {
        match self.links.entry(record.short_token.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                if self.eviction(slot.get(), now).is_some() {
                    slot.insert(record);
                    Ok(())
                } else {
                    Err(record)
                }
            }
        }
    }

    /// Returns a snapshot of the record if it is live; evicts it otherwise.
    ///
    /// Live records are served under the shard read lock. A dead record is
    /// checked again under the entry lock before removal, so among racing
    /// readers exactly one sees `Evicted` and the rest see `Missing`.
    pub fn get(&self, token: &ShortToken, now: Timestamp) -> Access<LinkRecord> {
        match self.links.get(token) {
            None => return Access::Missing,
            Some(link) if self.eviction(link.value(), now).is_none() => {
                return Access::Found(link.value().clone());
            }
            Some(_) => {}
        }

        let Entry::Occupied(slot) = self.links.entry(token.clone()) else {
            return Access::Missing;
        };

        if let Some(eviction) = self.eviction(slot.get(), now) {
            slot.remove();
            return Access::Evicted(eviction);
        }

        Access::Found(slot.get().clone())
    }

    /// Registers one visit against a live record.
    ///
    /// The visit that brings `visit_count` up to `visit_limit` removes the
    /// record in the same step.
    pub fn visit(&self, token: &ShortToken, now: Timestamp) -> Access<Visit> {
        let Entry::Occupied(mut slot) = self.links.entry(token.clone()) else {
            return Access::Missing;
        };

        if let Some(eviction) = self.eviction(slot.get(), now) {
            slot.remove();
            return Access::Evicted(eviction);
        }

        let link = slot.get_mut();
        link.visit_count += 1;
        let visit = Visit {
            original_url: link.original_url.clone(),
            visit_count: link.visit_count,
            last: link.is_exhausted(),
        };

        if visit.last {
            slot.remove();
        }

        Access::Found(visit)
    }

    /// Removes a live record owned by `caller_id`.
    ///
    /// `Found(false)` means the record exists but belongs to someone else.
    pub fn remove_owned(&self, token: &ShortToken, caller_id: &str, now: Timestamp) -> Access<bool> {
        let Entry::Occupied(slot) = self.links.entry(token.clone()) else {
            return Access::Missing;
        };

        if let Some(eviction) = self.eviction(slot.get(), now) {
            slot.remove();
            return Access::Evicted(eviction);
        }

        if !slot.get().is_owned_by(caller_id) {
            return Access::Found(false);
        }

        slot.remove();
        Access::Found(true)
    }

    /// Sets the visit limit of a live record owned by `caller_id`.
    ///
    /// `Found(false)` means the record exists but belongs to someone else.
    pub fn update_limit_owned(
        &self,
        token: &ShortToken,
        caller_id: &str,
        new_limit: u32,
        now: Timestamp,
    ) -> Access<bool> {
        let Entry::Occupied(mut slot) = self.links.entry(token.clone()) else {
            return Access::Missing;
        };

        if let Some(eviction) = self.eviction(slot.get(), now) {
            slot.remove();
            return Access::Evicted(eviction);
        }

        let link = slot.get_mut();
        if !link.is_owned_by(caller_id) {
            return Access::Found(false);
        }

        link.visit_limit = new_limit;
        Access::Found(true)
    }

    /// Removes every dead record and returns how many were dropped.
    ///
    /// Shards are locked one at a time.
    pub fn purge_dead(&self, now: Timestamp) -> usize {
        let mut removed = 0;
        self.links.retain(|_, link| {
            let live = link.is_live(now, self.ttl);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Whether a record is physically stored under `token`, dead or alive.
    pub fn contains(&self, token: &ShortToken) -> bool {
        self.links.contains_key(token)
    }

    /// Number of physically stored records, including dead ones not yet evicted.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
