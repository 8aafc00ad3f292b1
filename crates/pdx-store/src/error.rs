use thiserror::Error;

/// Store failures are fatal for the containing operation; a dedup conflict
/// is not among them (it surfaces as `inserted < input` on batch insert).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage: open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("storage: migrate: {0}")]
    Migrate(#[source] rusqlite::Error),
    #[error("storage: {context}: {source}")]
    Query {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    /// FOREIGN KEY / NOT NULL / unique violations. The dedup index does not
    /// surface here: batch inserts absorb it with `OR IGNORE`.
    #[error("storage: {context}: constraint violated: {source}")]
    Constraint {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("storage: serialize extra: {0}")]
    Extra(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap a rusqlite error, splitting constraint violations out of
    /// generic query failures by SQLite error code.
    pub(crate) fn query(context: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| {
            let constraint = matches!(
                &source,
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation
            );
            if constraint {
                Self::Constraint { context, source }
            } else {
                Self::Query { context, source }
            }
        }
    }
}
