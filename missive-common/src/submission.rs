//! Contact-form submissions.
//!
//! A [`Submission`] is built from a loosely-typed [`Record`] (whatever the
//! request body decoded to) and lives for a single request. Nothing here is
//! ever persisted.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// A decoded request body, keyed by form field name.
pub type Record = serde_json::Map<String, Value>;

/// Field carrying the bot trap. Humans never see it, so never fill it.
pub const HONEYPOT_FIELD: &str = "_honeypot";

#[allow(
    clippy::expect_used,
    reason = "The pattern is a literal and is covered by tests"
)]
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// Reasons a submission is turned away before any delivery is attempted.
///
/// The display strings are shown verbatim to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Il campo name è obbligatorio")]
    MissingName,

    #[error("Il campo email è obbligatorio")]
    MissingEmail,

    #[error("Email non valida")]
    InvalidEmail,

    #[error("Il campo message è obbligatorio")]
    MissingMessage,
}

/// The fields of a contact request, trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub honeypot: String,
}

impl Submission {
    /// Extract the known fields from a decoded body.
    ///
    /// Missing fields become empty strings. Values that are not strings are
    /// rendered to text so that `{"name": 42}` still counts as a name.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: field(record, "name"),
            email: field(record, "email"),
            message: field(record, "message"),
            honeypot: field(record, HONEYPOT_FIELD),
        }
    }

    /// Whether the honeypot was filled in.
    #[must_use]
    pub const fn is_bot(&self) -> bool {
        !self.honeypot.is_empty()
    }

    /// Check the visible fields, stopping at the first problem.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing the first failing check,
    /// in the order name, email presence, email shape, message.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        if self.email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }

        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }

        if self.message.is_empty() {
            return Err(ValidationError::MissingMessage);
        }

        Ok(())
    }
}

/// Loose shape check: something, `@`, something with a dot, no whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(&email.to_lowercase())
}

fn field(record: &Record, key: &str) -> String {
    let text = match record.get(key) {
        None | Some(Value::Null | Value::Bool(false)) => return String::new(),
        Some(Value::String(s)) => return s.trim().to_string(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => return String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(other @ (Value::Array(_) | Value::Object(_))) => display(other),
    };

    text.trim().to_string()
}

/// Render a value the way a repeated form field reads: array items joined
/// with `,`, nested arrays flattened, nulls left empty.
fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
