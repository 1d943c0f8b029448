//! Ordered fallback across transports.

use std::sync::Arc;

use crate::{
    DeliveryConfig, DeliveryError, FailedAttempt, OutboundMessage, ResendTransport, SmtpTransport,
    Transport, TransportError,
};

/// Transports tried in order until one accepts the message.
///
/// Each transport is tried at most once per call, so a message is never
/// handed over twice.
#[derive(Clone, Default)]
pub struct DeliveryChain {
    transports: Vec<Arc<dyn Transport>>,
}

impl std::fmt::Debug for DeliveryChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.transports.iter().map(|t| t.name()))
            .finish()
    }
}

impl DeliveryChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resend first, SMTP second.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for Resend cannot be built.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, TransportError> {
        Ok(Self::new()
            .with(ResendTransport::new(config.resend.clone())?)
            .with(SmtpTransport::new(config.smtp.clone())))
    }

    /// Appends a transport to the end of the chain.
    #[must_use]
    pub fn with(mut self, transport: impl Transport + 'static) -> Self {
        self.transports.push(Arc::new(transport));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Hand `message` to each transport in turn.
    ///
    /// Returns the name of the transport that accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Exhausted`] with every failure if no
    /// transport accepted the message.
    pub async fn deliver(&self, message: &OutboundMessage) -> Result<&'static str, DeliveryError> {
        let mut attempts = Vec::with_capacity(self.transports.len());

        for transport in &self.transports {
            let name = transport.name();
            match transport.deliver(message).await {
                Ok(()) => {
                    tracing::info!(
                        transport = name,
                        failed_before = attempts.len(),
                        "Notification delivered"
                    );
                    return Ok(name);
                }
                Err(error) => {
                    tracing::error!(transport = name, %error, "Delivery attempt failed");
                    attempts.push(FailedAttempt {
                        transport: name,
                        error,
                    });
                }
            }
        }

        Err(DeliveryError::Exhausted { attempts })
    }
}
