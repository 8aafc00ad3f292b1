//! SQLite-backed persistence for profiles, configs, and subscriptions.
//!
//! Single-writer discipline: one connection behind a mutex, WAL journal,
//! foreign keys on. Profile aggregate counters (`config_count`,
//! `alive_count`) are maintained by triggers, and the unique
//! `(protocol, server, port, uuid, password)` index backs dedup at the
//! storage layer as a safety net behind the normalizer. All multi-row
//! mutations run in one transaction.

mod configs;
mod error;
mod profiles;
pub mod query;
mod rows;
mod store;
mod subscriptions;

pub use error::StoreError;
pub use rows::{ConfigRow, ProfileRow, ProfileType};
pub use store::Store;
