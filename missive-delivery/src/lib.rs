//! Delivery of contact notifications.
//!
//! A notification is handed to an ordered [`DeliveryChain`] of
//! [`Transport`]s. The first transport that accepts it ends the attempt;
//! each failure is logged and the next transport is tried. The default
//! chain is the Resend HTTP API followed by direct SMTP submission.
//!
//! ```rust,no_run
//! use missive_delivery::{DeliveryChain, DeliveryConfig, OutboundMessage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeliveryConfig::default();
//! let chain = DeliveryChain::from_config(&config)?;
//!
//! let message = OutboundMessage {
//!     from: "site@example.com".to_string(),
//!     to: "owner@example.com".to_string(),
//!     reply_to: "visitor@example.org".to_string(),
//!     subject: "Richiesta info".to_string(),
//!     text: "Hello".to_string(),
//! };
//!
//! let transport = chain.deliver(&message).await?;
//! println!("delivered via {transport}");
//! # Ok(())
//! # }
//! ```

mod chain;
mod config;
mod error;
mod resend;
mod smtp;
mod transport;
mod types;

pub use chain::DeliveryChain;
pub use config::{DeliveryConfig, ResendConfig, SmtpConfig, SmtpTimeouts};
pub use error::{DeliveryError, FailedAttempt, TransportError};
pub use resend::ResendTransport;
pub use smtp::SmtpTransport;
pub use transport::Transport;
pub use types::OutboundMessage;
