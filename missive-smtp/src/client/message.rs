//! RFC 5322 message builder for plain-text notifications.

use std::fmt::Write;

use super::error::{ClientError, Result};

/// Builder for a single-part `text/plain` message.
///
/// ```
/// use missive_smtp::client::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .from("site@example.com")
///     .to("owner@example.com")
///     .reply_to("visitor@example.org")
///     .subject("Hello")
///     .body("This is the message body")
///     .build()
///     .unwrap();
///
/// assert!(message.contains("Reply-To: visitor@example.org\r\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl MessageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from(mut self, email: impl Into<String>) -> Self {
        self.from = Some(email.into());
        self
    }

    /// Adds a recipient to the To header.
    #[must_use]
    pub fn to(mut self, email: impl Into<String>) -> Self {
        self.to.push(email.into());
        self
    }

    #[must_use]
    pub fn reply_to(mut self, email: impl Into<String>) -> Self {
        self.reply_to = Some(email.into());
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Adds a custom header. Headers are written in insertion order.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, content: impl Into<String>) -> Self {
        self.body = Some(content.into());
        self
    }

    /// Renders the message with CRLF line endings.
    ///
    /// `Date` and `Message-ID` are generated. The domain of the From address
    /// is used as the right-hand side of the Message-ID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidHeader` if any header value contains a
    /// CR or LF, which would otherwise let a value inject extra headers.
    pub fn build(self) -> Result<String> {
        let mut headers: Vec<(String, String)> = Vec::with_capacity(self.headers.len() + 7);

        headers.push(("Date".to_string(), chrono::Utc::now().to_rfc2822()));
        headers.push(("Message-ID".to_string(), self.message_id()));

        if let Some(from) = self.from {
            headers.push(("From".to_string(), from));
        }

        if !self.to.is_empty() {
            headers.push(("To".to_string(), self.to.join(", ")));
        }

        if let Some(reply_to) = self.reply_to {
            headers.push(("Reply-To".to_string(), reply_to));
        }

        if let Some(subject) = self.subject {
            headers.push(("Subject".to_string(), subject));
        }

        headers.extend(self.headers);

        headers.push(("MIME-Version".to_string(), "1.0".to_string()));
        headers.push((
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        ));
        headers.push(("Content-Transfer-Encoding".to_string(), "8bit".to_string()));

        let mut message = String::with_capacity(1024);
        for (name, value) in &headers {
            if value.contains(['\r', '\n']) {
                return Err(ClientError::InvalidHeader { name: name.clone() });
            }
            let _ = write!(message, "{name}: {value}\r\n");
        }

        message.push_str("\r\n");

        if let Some(body) = self.body {
            for line in crate::encoding::lines(&body) {
                message.push_str(line);
                message.push_str("\r\n");
            }
        }

        Ok(message)
    }

    fn message_id(&self) -> String {
        let domain = self
            .from
            .as_deref()
            .and_then(|from| from.rsplit_once('@'))
            .map_or("localhost", |(_, domain)| domain.trim_end_matches('>'));

        format!("<{}@{domain}>", ulid::Ulid::new())
    }
}
