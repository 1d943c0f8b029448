//! Contact endpoint errors and their HTTP representation

use std::time::Duration;

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use missive_common::ValidationError;
use missive_delivery::DeliveryError;
use serde_json::{Value, json};
use thiserror::Error;

use crate::body::BodyError;

/// Errors that can occur running the server itself
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("Failed to bind contact server to {address}: {source}")]
    BindError {
        address: String,
        source: std::io::Error,
    },

    /// Server encountered a runtime error
    #[error("Contact server error: {0}")]
    ServerError(String),
}

/// Why a contact request did not end in a delivered notification
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Metodo non consentito")]
    MethodNotAllowed,

    #[error("Too many requests")]
    RateLimited { retry_after: Duration },

    #[error("Body non valido")]
    InvalidBody(#[from] BodyError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A delivery address is missing; the detail is logged, never shown
    #[error("Configurazione server incompleta")]
    Misconfigured(&'static str),

    #[error("Invio email non riuscito")]
    Delivery(#[from] DeliveryError),

    #[error("Errore interno")]
    Internal(String),
}

impl ContactError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Misconfigured(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn log(&self) {
        match self {
            Self::InvalidBody(e) => tracing::warn!(error = %e, "Rejected contact body"),
            Self::Misconfigured(detail) => {
                tracing::error!(detail, "Contact endpoint is misconfigured");
            }
            Self::Delivery(e) => tracing::error!(error = %e, "Notification not delivered"),
            Self::Internal(detail) => tracing::error!(detail, "Contact request failed"),
            Self::MethodNotAllowed | Self::RateLimited { .. } | Self::Validation(_) => {
                tracing::debug!(status = self.status().as_u16(), reason = %self, "Contact request rejected");
            }
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        self.log();

        let mut response = json_response(self.status(), &json!({ "error": self.to_string() }));
        let headers = response.headers_mut();

        match self {
            Self::MethodNotAllowed => {
                headers.insert(header::ALLOW, HeaderValue::from_static("POST"));
            }
            Self::RateLimited { retry_after } => {
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(retry_after)));
            }
            _ => {}
        }

        response
    }
}

/// A JSON body with the headers every contact response carries
pub(crate) fn json_response(status: StatusCode, body: &Value) -> Response {
    (
        status,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        body.to_string(),
    )
        .into_response()
}

/// Whole seconds, rounded up
fn retry_after_secs(wait: Duration) -> u64 {
    u64::try_from(wait.as_millis().div_ceil(1000)).unwrap_or(u64::MAX)
}
