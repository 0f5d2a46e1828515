use crate::chain::ErrorChain;
use std::time::Duration;
use thiserror::Error;

/// Boxed error type used for transport-level causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors captured while a [`Client`](crate::Client) is being configured.
///
/// These never surface from the configuration call itself. They are appended
/// to the client's [`ErrorChain`] and returned as [`HttpError::Config`] by the
/// first terminal operation (`get`, `post`, `execute`, `dispatch`, ...).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// Proxy URL could not be parsed or uses an unsupported scheme
    #[error("invalid proxy url '{url}': {reason}")]
    InvalidProxy { url: String, reason: String },

    /// Raw query string is malformed
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// Header name is not a valid HTTP token
    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Header value contains forbidden bytes
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Structured body is neither an object nor a sequence
    #[error("no content to set")]
    NoContent,

    /// Structured body could not be serialized
    #[error("failed to encode json body: {0}")]
    Json(#[from] serde_json::Error),

    /// Multipart form could not be written
    #[error("failed to write multipart form: {0}")]
    Multipart(#[from] std::io::Error),

    /// Operation needs the built-in transport but a custom one is installed
    #[error("transport is not the built-in hyper transport: {0}")]
    IncompatibleTransport(&'static str),
}

/// HTTP client error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// One or more configuration errors were accumulated before the terminal call
    #[error(transparent)]
    Config(ErrorChain),

    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Final URL could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri { url: String, reason: String },

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Caller cancelled the operation
    #[error("Request cancelled")]
    Cancelled,

    /// Transport error (DNS, connection, proxy, body stream)
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(#[source] BoxError),

    /// Streaming request body was already sent by an earlier request
    #[error("request body stream was already consumed")]
    BodyConsumed,

    /// Response body exceeded size limit
    #[error("Response body too large: limit {limit} bytes, got at least {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Response status is outside the successful range
    #[error("HTTP {status}: unsuccessful response status")]
    HttpStatus {
        status: http::StatusCode,
        content_type: Option<String>,
    },

    /// Response content type cannot be decoded as JSON
    #[error("cannot decode response with content type '{content_type}' as json")]
    NotJson { content_type: String },

    /// JSON parsing error
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ErrorChain> for HttpError {
    fn from(chain: ErrorChain) -> Self {
        HttpError::Config(chain)
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}
