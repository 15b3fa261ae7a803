//! Domain events and the live change feed.
//!
//! Storage adapters publish a `Change` for every add/update/delete. Read-side
//! consumers subscribe with a filter (usually "this tenant only") and receive a
//! live stream of matching changes.

pub mod change;
pub mod event;
pub mod feed;
pub mod in_memory_feed;
pub mod tenant;

pub use change::Change;
pub use event::Event;
pub use feed::{ChangeFeed, Filter, Subscription};
pub use in_memory_feed::{FeedError, InMemoryChangeFeed};
pub use tenant::TenantScoped;
