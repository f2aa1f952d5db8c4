use thiserror::Error;

/// Failures at the host boundary. Extraction and generalization themselves
/// never fail; they report through flags and sentinels instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown site id {0:?}")]
    UnknownSite(String),

    #[error("no registered site handles {0}")]
    NoSiteForUrl(String),

    #[error("raw record does not match the site's schema: {0}")]
    RawRecord(#[from] serde_json::Error),

    #[error("could not load options: {0}")]
    Options(#[from] config::ConfigError),
}
