//! Error types for ransim

use thiserror::Error;

/// Errors surfaced by the protocol engine to its callers.
///
/// Lower layers keep their own error enums; they are folded into one of
/// these variants at the entity boundary so the management surface only ever
/// sees structured results.
#[derive(Debug, Error)]
pub enum Error {
    /// The AMF endpoint could not be reached.
    #[error("Transport connect error: {0}")]
    TransportConnect(String),

    /// A send or receive failed on an established transport session.
    #[error("Transport I/O error: {0}")]
    TransportIo(String),

    /// A malformed or unrecognized message was received.
    #[error("Protocol decode error: {0}")]
    ProtocolDecode(String),

    /// The requested operation is not valid in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network I/O errors.
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type for ransim operations.
pub type Result<T> = std::result::Result<T, Error>;
