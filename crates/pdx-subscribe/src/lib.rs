//! Ingestion pipeline: turn arbitrary text into validated endpoint configs.
//!
//! The flow is `extract` (pull URIs out of noisy text) → `parse` (per-scheme
//! decoding into [`pdx_types::RawConfig`]) → `normalize` (validate, clean,
//! dedup). [`fetch`] feeds the front of that pipe from subscription URLs,
//! including one level of nested subscriptions.
//!
//! Per-item failures never abort a batch: each stage returns its successes
//! and logs the rest at WARN.

pub mod extract;
pub mod fetch;
pub mod names;
pub mod normalize;
pub mod parse;

mod error;

pub use error::SubsError;
pub use extract::extract_uris;
pub use fetch::{fetch_subscription, ingest_source, is_subscription_url};
pub use normalize::normalize_all;
pub use parse::{parse_all, parse_uri};
