//! Fallback transport: direct SMTP submission.
//!
//! One connection per notification:
//! 1. Connect (implicit TLS on port 465) and read the greeting
//! 2. EHLO, then STARTTLS and EHLO again when the server offers it
//! 3. AUTH PLAIN
//! 4. MAIL FROM, RCPT TO, DATA and the message
//! 5. QUIT, whose failure is only logged since the message was accepted

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use missive_smtp::client::{self, MessageBuilder, Response, SmtpClient};

use crate::{OutboundMessage, SmtpConfig, Transport, TransportError, config::SmtpCredentials};

const SMTPS_PORT: u16 = 465;

/// Delivers by talking SMTP to the configured submission server.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    config: SmtpConfig,
}

impl SmtpTransport {
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    async fn connect(&self, credentials: &SmtpCredentials<'_>) -> Result<SmtpClient, TransportError> {
        let address = format!("{}:{}", credentials.host, credentials.port);
        let server_domain = credentials.host.to_string();
        let accept_invalid_certs = self.config.accept_invalid_certs;
        let limit = self.config.timeouts.connect();

        let connecting = async {
            let mut client = if credentials.port == SMTPS_PORT {
                SmtpClient::connect_tls(&address, server_domain, accept_invalid_certs).await?
            } else {
                SmtpClient::connect(&address, server_domain)
                    .await?
                    .accept_invalid_certs(accept_invalid_certs)
            };
            let greeting = client.read_greeting().await?;
            Ok::<_, client::ClientError>((client, greeting))
        };

        let (client, greeting) = tokio::time::timeout(limit, connecting)
            .await
            .map_err(|_| TransportError::Timeout {
                stage: "connect",
                timeout: limit,
            })??;

        if !greeting.is_success() {
            return Err(rejected("greeting", &greeting));
        }

        Ok(client)
    }

    /// EHLO, upgrading with STARTTLS when offered or required.
    async fn negotiate(&self, client: &mut SmtpClient) -> Result<(), TransportError> {
        let helo = self.config.helo_name.as_str();
        let limit = self.config.timeouts.command();

        let ehlo = expect("EHLO", limit, client.ehlo(helo), Response::is_success).await?;

        if client.is_tls() {
            return Ok(());
        }

        if !ehlo.supports("STARTTLS") {
            if self.config.require_tls {
                return Err(TransportError::NotConfigured(
                    "TLS required but the server does not offer STARTTLS".to_string(),
                ));
            }
            tracing::warn!(helo, "SMTP server does not offer STARTTLS, continuing in plaintext");
            return Ok(());
        }

        let starttls = tokio::time::timeout(limit, client.starttls())
            .await
            .map_err(|_| TransportError::Timeout {
                stage: "STARTTLS",
                timeout: limit,
            })??;

        if !starttls.is_success() {
            if self.config.require_tls {
                return Err(rejected("STARTTLS", &starttls));
            }
            tracing::warn!(
                response = %starttls.message(),
                "SMTP server refused STARTTLS, continuing in plaintext"
            );
            return Ok(());
        }

        expect("EHLO", limit, client.ehlo(helo), Response::is_success).await?;
        tracing::debug!("TLS negotiated via STARTTLS");

        Ok(())
    }

    async fn transact(
        &self,
        client: &mut SmtpClient,
        credentials: &SmtpCredentials<'_>,
        message: &OutboundMessage,
    ) -> Result<(), TransportError> {
        let command = self.config.timeouts.command();
        let data = self.config.timeouts.data();

        expect(
            "AUTH",
            command,
            client.auth_plain(credentials.username, credentials.password),
            Response::is_success,
        )
        .await?;

        expect(
            "MAIL FROM",
            command,
            client.mail_from(envelope_address(&message.from)),
            Response::is_success,
        )
        .await?;

        expect(
            "RCPT TO",
            command,
            client.rcpt_to(envelope_address(&message.to)),
            Response::is_success,
        )
        .await?;

        expect("DATA", command, client.data(), Response::is_intermediate).await?;

        let content = MessageBuilder::new()
            .from(&message.from)
            .to(&message.to)
            .reply_to(&message.reply_to)
            .subject(&message.subject)
            .body(&message.text)
            .build()?;

        expect(
            "message data",
            data,
            client.send_data(&content),
            Response::is_success,
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let Some(credentials) = self.config.credentials() else {
            return Err(TransportError::NotConfigured(
                "Credenziali SMTP mancanti".to_string(),
            ));
        };

        if self.config.accept_invalid_certs {
            tracing::warn!(
                host = credentials.host,
                "SECURITY WARNING: TLS certificate validation is disabled for this connection"
            );
        }

        let mut client = self.connect(&credentials).await?;
        self.negotiate(&mut client).await?;
        self.transact(&mut client, &credentials, message).await?;

        let limit = self.config.timeouts.command();
        match tokio::time::timeout(limit, client.quit()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "QUIT failed after successful delivery"),
            Err(_) => tracing::warn!(timeout = ?limit, "QUIT timed out after successful delivery"),
        }

        tracing::debug!(
            host = credentials.host,
            port = credentials.port,
            "SMTP server accepted message"
        );
        Ok(())
    }
}

/// Run one step with a time limit and check its reply.
async fn expect<F>(
    stage: &'static str,
    limit: Duration,
    step: F,
    accept: fn(&Response) -> bool,
) -> Result<Response, TransportError>
where
    F: Future<Output = client::Result<Response>>,
{
    let response = tokio::time::timeout(limit, step)
        .await
        .map_err(|_| TransportError::Timeout {
            stage,
            timeout: limit,
        })??;

    if accept(&response) {
        Ok(response)
    } else {
        Err(rejected(stage, &response))
    }
}

/// The bare address of `Name <addr>`, or the whole value trimmed.
fn envelope_address(mailbox: &str) -> &str {
    mailbox
        .rsplit_once('<')
        .and_then(|(_, rest)| rest.split_once('>'))
        .map_or(mailbox, |(address, _)| address)
        .trim()
}

fn rejected(stage: &'static str, response: &Response) -> TransportError {
    TransportError::SmtpRejected {
        stage,
        code: response.code,
        message: response.message(),
    }
}
