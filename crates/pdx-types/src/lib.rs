//! Core data model shared across the proxydex crates.
//!
//! Typed tags and config shapes live here so that the ingestion, probing,
//! storage, and export crates agree on one vocabulary. Crate-level errors
//! stay in the crate that produces them; this crate only defines data.

mod config;
mod ping;

pub use config::{Config, Protocol, RawConfig, Security, Transport};
pub use ping::{FailureTag, PingResult};
