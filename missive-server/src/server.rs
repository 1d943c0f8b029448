//! Contact HTTP server

use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use missive_common::Signal;
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::{AppState, ContactError, ServerError, handler};

/// Build the application router.
///
/// - `/api/contact`: every method, so anything but POST gets a JSON 405
/// - `/health/live`: plain `OK` for container probes
///
/// A panic in any handler becomes a JSON `500 Errore interno`.
pub fn router(state: Arc<AppState>) -> Router {
    let health = Router::new()
        .route("/health/live", get(liveness_handler))
        .layer(TimeoutLayer::new(Duration::from_secs(1)));

    Router::new()
        .route("/api/contact", any(handler::contact))
        .with_state(state)
        .merge(health)
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Contact HTTP server
///
/// Serves `/api/contact` and `/health/live` until a shutdown signal arrives.
pub struct ContactServer {
    listener: TcpListener,
    router: Router,
}

impl ContactServer {
    /// Bind the listener and build the router
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn new(listen_address: &str, state: Arc<AppState>) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(listen_address)
                .await
                .map_err(|e| ServerError::BindError {
                    address: listen_address.to_string(),
                    source: e,
                })?;

        tracing::info!(address = %listen_address, "Contact server bound successfully");

        Ok(Self {
            listener,
            router: router(state),
        })
    }

    /// The address actually bound, useful when listening on port 0
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::ServerError(e.to_string()))
    }

    /// Run the server until a shutdown signal is received
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a runtime error.
    pub async fn serve(self, mut shutdown: broadcast::Receiver<Signal>) -> Result<(), ServerError> {
        tracing::info!("Contact server starting");

        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Contact server received shutdown signal");
        })
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

        tracing::info!("Contact server stopped");
        Ok(())
    }
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "unknown panic payload".to_string());

    ContactError::Internal(format!("handler panicked: {detail}")).into_response()
}
