use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level errors. Most runtime failures (a missing xinput, an unwritable
/// config file, a rejected property set) are logged and degraded instead of
/// propagated; only terminal and config-path problems end up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot expand config path: {0}")]
    Path(String),
}
