//! Test support utilities for delivery integration tests

pub mod mock_resend;
pub mod mock_smtp;
