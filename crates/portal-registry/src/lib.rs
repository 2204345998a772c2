//! In-memory short-link registry.
//!
//! This crate provides the [`LinkRegistry`], which maps generated short
//! tokens to original URLs, enforces a per-link visit quota and a global
//! time-to-live, and gates mutation on link ownership. Dead links are
//! evicted lazily on access and proactively by a background [`Sweeper`].
//!
//! # Example
//!
//! ```rust
//! use portal_registry::{LinkRegistry, RegistrySettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = LinkRegistry::new(RegistrySettings::default())?;
//!
//! let link = registry.create("https://example.com", "session-1", 2);
//! assert_eq!(
//!     registry.resolve_and_visit(&link.short_token).as_deref(),
//!     Some("https://example.com")
//! );
//!
//! registry.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod registry;
pub mod settings;
pub mod store;
pub mod sweeper;

pub use error::RegistryError;
pub use generator::{Generator, RandomGenerator, SeqGenerator};
pub use registry::LinkRegistry;
pub use settings::RegistrySettings;
pub use store::{Access, Eviction, LinkStore, Visit};
pub use sweeper::Sweeper;
