//! Primary transport: the Resend transactional email API.

use async_trait::async_trait;
use serde::Serialize;

use crate::{OutboundMessage, ResendConfig, Transport, TransportError};

/// Request body for `POST /emails`.
#[derive(Debug, Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    reply_to: &'a str,
}

/// Delivers through `POST {api_url}/emails` with a bearer token.
#[derive(Debug, Clone)]
pub struct ResendTransport {
    client: reqwest::Client,
    config: ResendConfig,
}

impl ResendTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ResendConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Transport for ResendTransport {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let Some(api_key) = self.config.api_key() else {
            return Err(TransportError::NotConfigured(
                "RESEND_API_KEY non configurata".to_string(),
            ));
        };

        let body = SendEmail {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            reply_to: &message.reply_to,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), "Resend accepted message");
        Ok(())
    }
}
