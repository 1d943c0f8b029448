//! Shared state for the contact endpoint

use missive_delivery::{DeliveryChain, DeliveryConfig, TransportError};

use crate::{RateLimiter, ServerConfig};

/// Everything a contact request needs, shared across requests
#[derive(Debug)]
pub struct AppState {
    pub(crate) limiter: RateLimiter,
    pub(crate) chain: DeliveryChain,
    from: Option<String>,
    to: Option<String>,
}

impl AppState {
    /// State with no delivery addresses; see [`Self::with_addresses`]
    #[must_use]
    pub const fn new(limiter: RateLimiter, chain: DeliveryChain) -> Self {
        Self {
            limiter,
            chain,
            from: None,
            to: None,
        }
    }

    /// Build the production state: the configured rate limiter and the
    /// Resend then SMTP delivery chain.
    ///
    /// # Errors
    ///
    /// Returns an error if a transport cannot be constructed.
    pub fn from_config(
        server: &ServerConfig,
        delivery: &DeliveryConfig,
    ) -> Result<Self, TransportError> {
        Ok(
            Self::new(RateLimiter::new(&server.rate_limit), DeliveryChain::from_config(delivery)?)
                .with_addresses(delivery.from_address(), delivery.to_address()),
        )
    }

    /// Sender and recipient of notifications. Blank values count as unset.
    #[must_use]
    pub fn with_addresses(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        let non_blank = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        self.from = non_blank(from);
        self.to = non_blank(to);
        self
    }

    pub(crate) fn sender(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub(crate) fn recipient(&self) -> Option<&str> {
        self.to.as_deref()
    }
}
