//! SMTP submission client for missive.
//!
//! Only the client side of the protocol is implemented, and only as much of
//! it as is needed to hand a single notification to a submission server:
//! plain, implicit-TLS and STARTTLS connections, `AUTH PLAIN`, and a single
//! `MAIL`/`RCPT`/`DATA` transaction.

pub mod client;
mod encoding;

pub use client::{ClientError, MessageBuilder, Response, SmtpClient};
