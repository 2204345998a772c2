//! Core types for the Portal short-link registry.
//!
//! This crate provides the link record, the short token and the clock
//! abstraction shared by the registry and the console front-end.

pub mod clock;
pub mod error;
pub mod link;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CoreError;
pub use link::LinkRecord;
pub use token::ShortToken;
