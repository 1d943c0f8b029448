//! Test support for contact endpoint integration tests
//!
//! - [`RecordingTransport`]: a transport that accepts, fails or panics on
//!   demand and records every message handed to it
//! - [`TestApp`]: a router wired to recording transports and a manual clock

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use missive_delivery::{DeliveryChain, OutboundMessage, Transport, TransportError};
use missive_server::{AppState, ManualClock, RateLimitConfig, RateLimiter, router};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    Reject,
    Panic,
}

#[derive(Clone)]
pub struct RecordingTransport {
    name: &'static str,
    outcome: Outcome,
    attempts: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingTransport {
    pub fn new(name: &'static str, outcome: Outcome) -> Self {
        Self {
            name,
            outcome,
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every message this transport was asked to deliver
    pub fn attempts(&self) -> Vec<OutboundMessage> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.attempts.lock().push(message.clone());

        match self.outcome {
            Outcome::Accept => Ok(()),
            Outcome::Reject => Err(TransportError::Rejected {
                status: 500,
                body: format!("{} unavailable", self.name),
            }),
            Outcome::Panic => panic!("{} blew up", self.name),
        }
    }
}

pub const WINDOW: Duration = Duration::from_secs(600);
pub const MAX_REQUESTS: usize = 6;

pub struct TestApp {
    pub router: Router,
    pub clock: ManualClock,
    pub primary: RecordingTransport,
    pub fallback: RecordingTransport,
}

impl TestApp {
    pub fn new(primary: Outcome, fallback: Outcome) -> Self {
        Self::with_addresses(
            primary,
            fallback,
            Some("site@example.com"),
            Some("owner@example.com"),
        )
    }

    pub fn with_addresses(
        primary: Outcome,
        fallback: Outcome,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Self {
        let clock = ManualClock::new();
        let primary = RecordingTransport::new("primary", primary);
        let fallback = RecordingTransport::new("fallback", fallback);

        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: true,
            window_ms: u64::try_from(WINDOW.as_millis()).unwrap_or(u64::MAX),
            max_requests: MAX_REQUESTS,
            capacity: None,
        })
        .with_clock(clock.clone());

        let chain = DeliveryChain::new()
            .with(primary.clone())
            .with(fallback.clone());

        let state = AppState::new(limiter, chain).with_addresses(from, to);

        Self {
            router: router(Arc::new(state)),
            clock,
            primary,
            fallback,
        }
    }

    pub fn delivery_attempts(&self) -> usize {
        self.primary.attempts().len() + self.fallback.attempts().len()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {})
    }
}

/// A JSON `POST /api/contact` from `client`
pub fn json_request(client: &str, body: &Value) -> Request<Body> {
    Request::post("/api/contact")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|e| panic!("invalid request: {e}"))
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|e| panic!("unreadable body: {e}"));
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("body is not JSON: {e}"))
}
