//! SMTP client connection, reply parsing and message formatting.
//!
//! # Example
//!
//! ```no_run
//! use missive_smtp::client::{MessageBuilder, SmtpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = SmtpClient::connect("smtp.example.com:587", "smtp.example.com".to_string()).await?;
//! client.read_greeting().await?;
//!
//! let ehlo = client.ehlo("relay.example.com").await?;
//! if ehlo.supports("STARTTLS") {
//!     client.starttls().await?;
//!     client.ehlo("relay.example.com").await?;
//! }
//!
//! client.auth_plain("user", "secret").await?;
//! client.mail_from("site@example.com").await?;
//! client.rcpt_to("owner@example.com").await?;
//! client.data().await?;
//!
//! let message = MessageBuilder::new()
//!     .from("site@example.com")
//!     .to("owner@example.com")
//!     .reply_to("visitor@example.org")
//!     .subject("Hello")
//!     .body("Hi!")
//!     .build()?;
//! client.send_data(&message).await?;
//! client.quit().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod response;
mod smtp_client;

pub use error::{ClientError, Result};
pub use message::MessageBuilder;
pub use response::{Response, ResponseLine};
pub use smtp_client::SmtpClient;
