//! HTTP front end of the missive contact relay
//!
//! Provides `POST /api/contact`, which validates a contact-form submission
//! and forwards it to the site owner through a
//! [`missive_delivery::DeliveryChain`], and `GET /health/live` for probes.
//!
//! Every contact response is JSON, either `{"ok": true}` or
//! `{"error": "..."}`:
//!
//! | Status | When                                             |
//! |--------|--------------------------------------------------|
//! | 200    | delivered, or silently dropped by the honeypot   |
//! | 400    | unreadable body or a failed field check          |
//! | 405    | any method but POST                              |
//! | 429    | client exceeded its window (`Retry-After` set)   |
//! | 500    | delivery addresses missing, or an internal fault |
//! | 502    | every transport failed                           |

pub mod body;
pub mod client;
mod config;
mod error;
mod handler;
pub mod rate_limit;
mod server;
mod state;

pub use config::{RateLimitConfig, ServerConfig};
pub use error::{ContactError, ServerError};
pub use handler::Accepted;
pub use rate_limit::{
    Clock, ManualClock, MemoryStore, RateLimitDecision, RateLimitStore, RateLimiter, SystemClock,
};
pub use server::{ContactServer, router};
pub use state::AppState;
