//! Mock Resend API.
//!
//! Serves `POST /emails`, recording the bearer token and JSON body of every
//! request, and answers with a configurable status.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::RwLock, task::JoinHandle};

#[derive(Debug, Clone)]
pub struct ReceivedEmail {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    received: Arc<RwLock<Vec<ReceivedEmail>>>,
}

pub struct MockResendServer {
    addr: SocketAddr,
    received: Arc<RwLock<Vec<ReceivedEmail>>>,
    handle: JoinHandle<()>,
}

impl MockResendServer {
    /// Accept every request with `200 OK`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to a port
    pub async fn accepting() -> std::io::Result<Self> {
        Self::with_status(StatusCode::OK).await
    }

    /// Answer every request with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to a port
    pub async fn with_status(status: StatusCode) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let received = Arc::new(RwLock::new(Vec::new()));

        let app = Router::new()
            .route("/emails", post(send_email))
            .with_state(MockState {
                status,
                received: Arc::clone(&received),
            });

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            received,
            handle,
        })
    }

    /// Base URL to configure as `api_url`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn received(&self) -> Vec<ReceivedEmail> {
        self.received.read().await.clone()
    }
}

impl Drop for MockResendServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn send_email(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    state.received.write().await.push(ReceivedEmail {
        authorization,
        body,
    });

    if state.status.is_success() {
        (state.status, Json(json!({ "id": "mock-email-id" })))
    } else {
        (
            state.status,
            Json(json!({ "name": "validation_error", "message": "rejected by mock" })),
        )
    }
}
