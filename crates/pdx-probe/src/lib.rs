//! Probing engine: measure endpoint reachability without speaking the proxy
//! protocol.
//!
//! A probe is a TCP dial (plus a TLS client handshake when the config says
//! so) under a per-attempt deadline. Batches run with bounded concurrency
//! and preserve input order in the output. On top of the raw dial sit three
//! quality checks: failure tagging (classify why a dial failed), fake-ping
//! detection (suspiciously fast endpoints must sustain minimal throughput
//! over a raw TCP fetch — this proves the listener is a real TCP peer, NOT
//! that the proxy works end-to-end), and stability scoring over a follow-up
//! window.

mod classify;
mod config;
mod fake;
mod prober;
mod rank;
mod tls;

pub use classify::{mode_tag, tag_error_message};
pub use config::ProbeConfig;
pub use prober::Prober;
pub use rank::{rank_ordering, sort_ranked};
pub use tokio_util::sync::CancellationToken;
