//! Client-runtime document exporters.
//!
//! Pure translators from stored config rows to the JSON documents external
//! proxy clients consume. No I/O happens here; callers decide where the
//! text goes. Output is pretty-printed with two-space indent.

mod singbox;
mod xray;

pub use singbox::to_singbox;
pub use xray::to_xray;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no exportable configs")]
    Empty,
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}
