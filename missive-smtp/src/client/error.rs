//! Error types for the SMTP client.

use std::io;

use thiserror::Error;

/// Errors that can occur when talking to an SMTP server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error occurred during network operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse an SMTP reply from the server.
    #[error("Failed to parse SMTP response: {0}")]
    ParseError(String),

    /// TLS setup or handshake failed.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// A header value would have broken the message framing.
    #[error("Invalid header {name}: value contains a line break")]
    InvalidHeader { name: String },

    /// Connection was closed unexpectedly.
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Specialized `Result` type for SMTP client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
