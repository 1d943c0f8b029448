use async_trait::async_trait;

use crate::{OutboundMessage, TransportError};

/// A way of getting a notification to the site owner.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short, stable name used in logs.
    fn name(&self) -> &'static str;

    /// Attempt a single delivery. Implementations must not retry.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the transport is not configured or the
    /// remote side did not accept the message.
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError>;
}
