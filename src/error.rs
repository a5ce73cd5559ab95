// Error types for the peer ASN pipeline

use std::io;

/// Fatal errors: any of these aborts the run before a chart is drawn
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {status} from {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Empty response: neither result nor error in RPC reply")]
    EmptyResponse,

    #[error("Failed to initialize terminal UI: {0}")]
    UiInit(String),

    #[error("Terminal I/O error: {0}")]
    Terminal(#[from] io::Error),
}

/// Per-IP lookup failure. Logged and skipped, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("invalid IP address {0:?}")]
    InvalidAddress(String),

    #[error("lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed lookup response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("whois I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("address is not announced by any AS")]
    NotAnnounced,

    #[error("unrecognized whois reply: {0:?}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
