//! Shared types for the missive contact relay.
//!
//! - [`submission`]: the contact-form submission, field extraction and validation
//! - [`message`]: the notification text sent to the site owner
//! - [`logging`]: tracing subscriber setup and the `internal!`/`incoming!`/`outgoing!` macros

pub mod logging;
pub mod message;
pub mod submission;

pub use submission::{Submission, ValidationError};
pub use tracing;

/// Broadcast to long-running tasks by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
}
