use std::time::Duration;

use thiserror::Error;

/// Failures talking to the message gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, reset mid-request, etc.
    #[error("gateway unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The per-request deadline elapsed before the gateway answered.
    #[error("gateway request to {url} timed out after {}s", .after.as_secs())]
    Timeout { url: String, after: Duration },

    /// The gateway answered with a non-success HTTP status.
    #[error("gateway returned {status} for {url}")]
    Status { url: String, status: u16 },

    /// The response body was not the JSON shape we expect.
    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// `GET /` answered, but with a different service name.
    #[error("expected gateway '{expected}', got '{found}'")]
    IdentityMismatch { expected: String, found: String },
}

/// Failures in the durable state layer.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Keys become file names, so path separators and dot-names are refused.
    #[error("invalid state key: {0:?}")]
    InvalidKey(String),
}

/// Anything that can abandon a single poll tick.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    State(#[from] StateError),
}
