//! Error types for the reqwest transport.

use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for reqwest operations.
///
/// Converted into [`cogvis_core::Error`] at the provider boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Endpoint URL could not be built.
    #[error("Invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
    /// Header value could not be encoded.
    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl From<Error> for cogvis_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    cogvis_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    cogvis_core::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_builder() {
                    cogvis_core::Error::internal_error()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    cogvis_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => cogvis_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Url(e) => cogvis_core::Error::configuration()
                .with_message(e.to_string())
                .with_source(e),
            Error::Header(e) => cogvis_core::Error::configuration()
                .with_message("Subscription key is not a valid header value")
                .with_source(e),
        }
    }
}
