use thiserror::Error;

/// Error type for the ingestion pipeline.
///
/// `Parse` and `Invalid` mark a single bad config (non-fatal for a batch);
/// `Fetch` is fatal only for a direct single-source sync.
#[derive(Debug, Error)]
pub enum SubsError {
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("unknown scheme")]
    UnknownScheme,
}
