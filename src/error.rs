use std::string::FromUtf8Error;
use thiserror::Error;

/// Errors surfaced by the contract-read adapter and its supporting layers
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (permanent failures)
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error talking to {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    // Payload errors
    #[error("Decode error in field '{field}' at index {index}: {source}")]
    Decode {
        field: String,
        index: usize,
        #[source]
        source: FromUtf8Error,
    },

    #[error("Contract mismatch: expected {expected}, got {actual}")]
    ContractMismatch { expected: String, actual: String },

    #[error("Record not found: {id}")]
    NotFound { id: String },

    // Caller errors
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Failure classes a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint unreachable, call reverted, or malformed RPC response
    Transport,
    /// A byte-string was not valid UTF-8
    Decode,
    /// The returned tuple does not have the expected shape
    ContractMismatch,
    /// The identifier names no stored record
    NotFound,
    /// Bad configuration or caller input, detected before any call
    Configuration,
}

impl Error {
    /// Classify the error into the adapter's failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Transport { .. } | Self::Rpc { .. } => ErrorKind::Transport,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::ContractMismatch { .. } => ErrorKind::ContractMismatch,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Config(_) | Self::InvalidInput { .. } => ErrorKind::Configuration,
        }
    }

    pub fn contract_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ContractMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
