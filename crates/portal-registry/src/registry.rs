use crate::error::Result;
use crate::generator::{Generator, RandomGenerator};
use crate::settings::RegistrySettings;
use crate::store::{Access, Eviction, LinkStore};
use crate::sweeper::{sweep_once, Sweeper};
use portal_core::{Clock, LinkRecord, ShortToken, SystemClock};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The short-link registry.
///
/// Owns the link store, generates tokens, and runs the background sweep.
/// Operations never fail: absence, expiry, exhausted quota and foreign
/// ownership all surface as the same `None`/`false`, so callers cannot
/// find out which tokens belong to someone else.
///
/// Construction must happen inside a tokio runtime when the sweep is
/// enabled. Call [`shutdown`](Self::shutdown) to stop it; dropping the
/// registry also cancels it.
#[derive(Debug)]
pub struct LinkRegistry<C: Clock = SystemClock, G: Generator = RandomGenerator> {
    store: Arc<LinkStore>,
    clock: Arc<C>,
    generator: G,
    settings: RegistrySettings,
    sweeper: Option<Sweeper>,
}

impl LinkRegistry {
    /// Creates a registry backed by the system clock and random tokens.
    pub fn new(settings: RegistrySettings) -> Result<Self> {
        Self::with_parts(settings, SystemClock, RandomGenerator::new())
    }
}

impl<C: Clock, G: Generator> LinkRegistry<C, G> {
    /// Creates a registry with a custom clock and token generator.
    pub fn with_parts(settings: RegistrySettings, clock: C, generator: G) -> Result<Self> {
        settings.validate()?;

        let store = Arc::new(LinkStore::new(settings.ttl));
        let clock = Arc::new(clock);
        let sweeper = settings
            .sweep_interval
            .map(|every| Sweeper::spawn(Arc::clone(&store), Arc::clone(&clock), every))
            .transpose()?;

        Ok(Self {
            store,
            clock,
            generator,
            settings,
            sweeper,
        })
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Shortens `original_url` on behalf of `owner_id`.
    ///
    /// The URL is stored as given; validating it is the caller's job.
    pub fn create(
        &self,
        original_url: impl Into<String>,
        owner_id: impl Into<String>,
        visit_limit: u32,
    ) -> LinkRecord {
        let now = self.clock.now();
        let mut record = LinkRecord::new(
            original_url,
            self.generator.generate(),
            owner_id,
            visit_limit,
            now,
        );

        loop {
            match self.store.insert_new(record.clone(), now) {
                Ok(()) => break,
                Err(rejected) => {
                    warn!(token = %rejected.short_token, "short token collision, regenerating");
                    record = rejected;
                    record.short_token = self.generator.generate();
                }
            }
        }

        debug!(
            token = %record.short_token,
            visit_limit = record.visit_limit,
            "created link"
        );
        record
    }

    /// Same as [`create`](Self::create) with the configured default limit.
    pub fn create_with_default_limit(
        &self,
        original_url: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> LinkRecord {
        self.create(original_url, owner_id, self.settings.default_visit_limit)
    }

    /// Returns the live record behind `token`.
    ///
    /// A dead record is removed as part of the same lookup.
    pub fn lookup(&self, token: &ShortToken) -> Option<LinkRecord> {
        let access = self.store.get(token, self.clock.now());
        self.observe(token, access)
    }

    /// Resolves `token` for a redirect and counts the visit.
    ///
    /// Returns the original URL at most `visit_limit` times per link, even
    /// under concurrent callers.
    pub fn resolve_and_visit(&self, token: &ShortToken) -> Option<String> {
        let visit = self
            .observe(token, self.store.visit(token, self.clock.now()))?;

        if visit.last {
            debug!(
                token = %token,
                visit_count = visit.visit_count,
                "visit quota reached, link removed"
            );
        }

        Some(visit.original_url)
    }

    /// Deletes the link if `caller_id` owns it.
    pub fn delete(&self, token: &ShortToken, caller_id: &str) -> bool {
        let access = self.store.remove_owned(token, caller_id, self.clock.now());
        let removed = self.observe(token, access).unwrap_or(false);

        if removed {
            debug!(token = %token, "link deleted by owner");
        }
        removed
    }

    /// Sets a new visit limit if `caller_id` owns the link.
    ///
    /// A limit at or below the visits already consumed makes the link
    /// unreachable from the next access on.
    pub fn update_limit(&self, token: &ShortToken, caller_id: &str, new_limit: u32) -> bool {
        let access = self
            .store
            .update_limit_owned(token, caller_id, new_limit, self.clock.now());
        let updated = self.observe(token, access).unwrap_or(false);

        if updated {
            debug!(token = %token, new_limit, "visit limit updated");
        }
        updated
    }

    /// Runs one sweep pass now and returns how many dead links were removed.
    pub fn sweep_expired(&self) -> usize {
        sweep_once(&self.store, self.clock.now())
    }

    /// Number of stored links, including dead ones not evicted yet.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Stops the background sweep and waits for it to exit.
    ///
    /// Safe to call repeatedly, and a no-op when the sweep is disabled.
    pub async fn shutdown(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.shutdown().await;
        }
    }

    fn observe<T>(&self, token: &ShortToken, access: Access<T>) -> Option<T> {
        match access {
            Access::Found(value) => Some(value),
            Access::Evicted(Eviction::Expired) => {
                debug!(token = %token, "link expired, removed");
                None
            }
            Access::Evicted(Eviction::Exhausted) => {
                debug!(token = %token, "visit quota exhausted, link removed");
                None
            }
            Access::Missing => {
                trace!(token = %token, "short token not found");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SeqGenerator;
    use jiff::{SignedDuration, Timestamp};
    use portal_core::ManualClock;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const URL: &str = "https://example.com";

    fn offline_settings() -> RegistrySettings {
        RegistrySettings::builder().sweep_interval(None).build()
    }

    fn test_registry() -> (LinkRegistry<ManualClock, SeqGenerator>, ManualClock) {
        let clock = ManualClock::new("2025-11-04T10:00:00Z".parse::<Timestamp>().unwrap());
        let registry = LinkRegistry::with_parts(
            offline_settings(),
            clock.clone(),
            SeqGenerator::with_prefix("pt"),
        )
        .unwrap();
        (registry, clock)
    }

    /// Hands out a fixed list of tokens, then falls back to a sequence.
    struct ScriptedGenerator {
        script: Mutex<VecDeque<&'static str>>,
        fallback: SeqGenerator,
    }

    impl Generator for ScriptedGenerator {
        fn generate(&self) -> ShortToken {
            match self.script.lock().unwrap().pop_front() {
                Some(token) => ShortToken::new_unchecked(token),
                None => self.fallback.generate(),
            }
        }
    }

    #[test]
    fn create_returns_record_with_properties() {
        let (registry, clock) = test_registry();

        let link = registry.create(URL, "test-user-1", 10);

        assert_eq!(link.original_url, URL);
        assert_eq!(link.owner_id, "test-user-1");
        assert_eq!(link.visit_limit, 10);
        assert_eq!(link.visit_count, 0);
        assert_eq!(link.created_at, clock.now());
        assert_eq!(link.short_token.as_str(), "pt000000");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn create_with_default_limit_uses_settings() {
        let clock = ManualClock::new(Timestamp::from_second(0).unwrap());
        let settings = RegistrySettings::builder()
            .default_visit_limit(7)
            .sweep_interval(None)
            .build();
        let registry =
            LinkRegistry::with_parts(settings, clock, SeqGenerator::with_prefix("pt")).unwrap();

        let link = registry.create_with_default_limit(URL, "user");
        assert_eq!(link.visit_limit, 7);
    }

    #[test]
    fn create_retries_on_collision() {
        let clock = ManualClock::new(Timestamp::from_second(0).unwrap());
        let generator = ScriptedGenerator {
            script: Mutex::new(VecDeque::from(["dup00001", "dup00001", "dup00001"])),
            fallback: SeqGenerator::with_prefix("new"),
        };
        let registry = LinkRegistry::with_parts(offline_settings(), clock, generator).unwrap();

        let first = registry.create(URL, "a", 5);
        let second = registry.create("https://other.example", "b", 5);

        assert_eq!(first.short_token.as_str(), "dup00001");
        assert_eq!(second.short_token.as_str(), "new000000");
        assert_eq!(
            registry.lookup(&first.short_token).unwrap().original_url,
            URL
        );
        assert_eq!(
            registry.lookup(&second.short_token).unwrap().original_url,
            "https://other.example"
        );
    }

    #[test]
    fn create_reuses_token_of_dead_link() {
        let clock = ManualClock::new(Timestamp::from_second(0).unwrap());
        let generator = ScriptedGenerator {
            script: Mutex::new(VecDeque::from(["dup00001", "dup00001"])),
            fallback: SeqGenerator::with_prefix("new"),
        };
        let registry =
            LinkRegistry::with_parts(offline_settings(), clock.clone(), generator).unwrap();

        registry.create(URL, "a", 5);
        clock.advance(SignedDuration::from_hours(25));
        let second = registry.create("https://other.example", "b", 5);

        assert_eq!(second.short_token.as_str(), "dup00001");
        assert_eq!(registry.lookup(&second.short_token).unwrap().owner_id, "b");
    }

    #[test]
    fn lookup_unknown_token() {
        let (registry, _) = test_registry();
        assert!(registry
            .lookup(&ShortToken::new_unchecked("missing1"))
            .is_none());
    }

    #[test]
    fn resolve_increments_visit_count() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "test-user-1", 5);

        registry.resolve_and_visit(&link.short_token);
        registry.resolve_and_visit(&link.short_token);

        let updated = registry.lookup(&link.short_token).unwrap();
        assert_eq!(updated.visit_count, 2);
        assert_eq!(updated.remaining_visits(), 3);
    }

    #[test]
    fn single_visit_link_scenario() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "user-1", 1);

        assert_eq!(
            registry.resolve_and_visit(&link.short_token).as_deref(),
            Some(URL)
        );
        assert_eq!(registry.resolve_and_visit(&link.short_token), None);
        assert!(registry.lookup(&link.short_token).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn exactly_limit_visits_succeed() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "user-1", 3);

        let successes = (0..5)
            .filter_map(|_| registry.resolve_and_visit(&link.short_token))
            .count();

        assert_eq!(successes, 3);
        assert!(registry.lookup(&link.short_token).is_none());
    }

    #[test]
    fn zero_limit_never_resolves() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "user-1", 0);

        assert_eq!(registry.resolve_and_visit(&link.short_token), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn expired_link_is_removed_on_lookup() {
        let (registry, clock) = test_registry();
        let link = registry.create(URL, "user-1", 1);

        clock.advance(SignedDuration::from_secs(90_000));

        assert!(registry.lookup(&link.short_token).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn link_survives_until_the_deadline() {
        let (registry, clock) = test_registry();
        let link = registry.create(URL, "user-1", 1);

        clock.advance(SignedDuration::from_secs(86_399));
        assert!(registry.lookup(&link.short_token).is_some());

        clock.advance(SignedDuration::from_secs(1));
        assert!(registry.lookup(&link.short_token).is_none());
    }

    #[test]
    fn expired_link_does_not_resolve() {
        let (registry, clock) = test_registry();
        let link = registry.create(URL, "user-1", 10);

        clock.advance(SignedDuration::from_hours(25));

        assert_eq!(registry.resolve_and_visit(&link.short_token), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn owner_can_delete() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "test-user-1", 10);

        assert!(registry.delete(&link.short_token, "test-user-1"));
        assert!(registry.lookup(&link.short_token).is_none());
        assert!(!registry.delete(&link.short_token, "test-user-1"));
    }

    #[test]
    fn non_owner_cannot_delete() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "test-user-1", 10);

        assert!(!registry.delete(&link.short_token, "test-user-2"));
        assert!(registry.lookup(&link.short_token).is_some());
    }

    #[test]
    fn owner_can_update_limit() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "test-user-1", 10);

        assert!(registry.update_limit(&link.short_token, "test-user-1", 20));
        assert_eq!(registry.lookup(&link.short_token).unwrap().visit_limit, 20);
    }

    #[test]
    fn non_owner_cannot_update_limit() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "test-user-1", 10);

        assert!(!registry.update_limit(&link.short_token, "test-user-2", 20));
        assert_eq!(registry.lookup(&link.short_token).unwrap().visit_limit, 10);
    }

    #[test]
    fn update_on_missing_token_fails() {
        let (registry, _) = test_registry();
        assert!(!registry.update_limit(&ShortToken::new_unchecked("missing1"), "a", 5));
    }

    #[test]
    fn lowering_limit_below_visits_exhausts_link() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "owner", 5);
        registry.resolve_and_visit(&link.short_token);
        registry.resolve_and_visit(&link.short_token);

        assert!(registry.update_limit(&link.short_token, "owner", 1));

        assert_eq!(registry.resolve_and_visit(&link.short_token), None);
        assert!(registry.lookup(&link.short_token).is_none());
    }

    #[test]
    fn ownership_scenario() {
        let (registry, _) = test_registry();
        let link = registry.create(URL, "A", 10);

        assert!(!registry.delete(&link.short_token, "B"));
        assert!(!registry.update_limit(&link.short_token, "B", 5));
        assert!(registry.delete(&link.short_token, "A"));
    }

    #[test]
    fn expired_link_cannot_be_mutated() {
        let (registry, clock) = test_registry();
        let link = registry.create(URL, "owner", 5);
        clock.advance(SignedDuration::from_hours(25));

        assert!(!registry.update_limit(&link.short_token, "owner", 50));
        assert!(registry.is_empty());
    }

    #[test]
    fn manual_sweep_removes_only_dead_links() {
        let (registry, clock) = test_registry();
        registry.create(URL, "owner", 5);
        clock.advance(SignedDuration::from_hours(12));
        let fresh = registry.create(URL, "owner", 5);
        clock.advance(SignedDuration::from_hours(13));

        assert_eq!(registry.sweep_expired(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(&fresh.short_token).is_some());
    }

    #[test]
    fn construction_without_runtime_fails_when_sweep_enabled() {
        let err = LinkRegistry::new(RegistrySettings::default()).unwrap_err();
        assert!(matches!(err, crate::RegistryError::SchedulerUnavailable(_)));
    }

    #[test]
    fn construction_rejects_invalid_settings() {
        let settings = RegistrySettings::builder()
            .ttl(SignedDuration::from_secs(-5))
            .sweep_interval(None)
            .build();
        let err = LinkRegistry::new(settings).unwrap_err();
        assert!(matches!(err, crate::RegistryError::InvalidSettings(_)));
    }

    #[tokio::test]
    async fn shutdown_without_sweep_is_a_no_op() {
        let (registry, _) = test_registry();
        registry.shutdown().await;
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn default_registry_generates_random_tokens() {
        let registry = LinkRegistry::new(RegistrySettings::default()).unwrap();

        let first = registry.create(URL, "user", 1);
        let second = registry.create(URL, "user", 1);

        assert_eq!(first.short_token.as_str().len(), crate::generator::TOKEN_LENGTH);
        assert_ne!(first.short_token, second.short_token);

        registry.shutdown().await;
    }
}
