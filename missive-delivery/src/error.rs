//! Typed errors for notification delivery.
//!
//! [`TransportError`] describes why one transport did not accept a message
//! and drives the fallback decision. [`DeliveryError`] is what the caller
//! sees once every transport has been tried.

use std::{fmt::Write, time::Duration};

use missive_smtp::ClientError;
use thiserror::Error;

/// Why a single transport did not deliver.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Required credentials or settings are absent.
    #[error("{0}")]
    NotConfigured(String),

    /// The HTTP API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The HTTP request could not be completed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Network or protocol failure talking to the SMTP server.
    #[error("SMTP client error: {0}")]
    Client(#[from] ClientError),

    /// The SMTP server refused a step of the transaction.
    #[error("Server rejected {stage}: {code} {message}")]
    SmtpRejected {
        stage: &'static str,
        code: u16,
        message: String,
    },

    /// A step did not complete in time.
    #[error("{stage} timed out after {timeout:?}")]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },
}

/// One failed transport, in the order it was tried.
#[derive(Debug)]
pub struct FailedAttempt {
    pub transport: &'static str,
    pub error: TransportError,
}

/// Every transport in the chain failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("All transports failed: {}", summarize(.attempts))]
    Exhausted { attempts: Vec<FailedAttempt> },
}

impl DeliveryError {
    /// The individual failures, in the order they happened.
    #[must_use]
    pub fn attempts(&self) -> &[FailedAttempt] {
        match self {
            Self::Exhausted { attempts } => attempts,
        }
    }
}

fn summarize(attempts: &[FailedAttempt]) -> String {
    if attempts.is_empty() {
        return "no transports configured".to_string();
    }

    let mut summary = String::new();
    for (i, attempt) in attempts.iter().enumerate() {
        if i > 0 {
            summary.push_str("; ");
        }
        let _ = write!(summary, "{}: {}", attempt.transport, attempt.error);
    }
    summary
}
