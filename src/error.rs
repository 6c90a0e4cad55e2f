//! Typed configuration errors
//!
//! Transient failures (fetch, probe) never surface as errors; they
//! degrade to empty results or `working = false` at the point of
//! occurrence. The variants here are programmer errors and are raised
//! synchronously to the caller that triggered them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider was asked to extract before an extractor was bound.
    #[error("provider {0} has no extractor bound")]
    ExtractorNotSet(String),

    /// A sort was requested on a field name the proxy model does not have.
    #[error("unknown proxy field: {0}")]
    UnknownField(String),
}
