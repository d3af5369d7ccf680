//! In-memory storage for the session diagnostic log.
//!
//! - [`EventBuffer`]: fixed-capacity ring with in-place compaction
//! - [`ProviderOriginTracker`]: side-table of provider-sourced sequence numbers
//! - [`EventStore`]: the two combined, plus chronological and per-session queries

pub mod buffer;
pub mod origin;
pub mod query;
pub mod store;

pub use buffer::{DEFAULT_CAPACITY, EventBuffer};
pub use origin::ProviderOriginTracker;
pub use query::EventFilter;
pub use store::{EventStore, Origin, StoredEvent};
