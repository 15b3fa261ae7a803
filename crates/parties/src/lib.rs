//! Company clients.
//!
//! Individual (walk-in) customers are not stored here; orders carry their name as
//! free text.

pub mod client;

pub use client::{Client, ClientId, ContactInfo, RegisterClient};
