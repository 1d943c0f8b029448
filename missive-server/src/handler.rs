//! `/api/contact`: one request, at most one delivered notification

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use missive_common::{Submission, incoming, internal, message};
use missive_delivery::OutboundMessage;
use serde_json::json;

use crate::{
    AppState, ContactError,
    body::{self, BodyKind},
    client,
    error::json_response,
};

/// `200 { "ok": true }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted;

impl IntoResponse for Accepted {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, &json!({ "ok": true }))
    }
}

/// Steps, in order: method, client identity, rate limit, body, honeypot,
/// validation, delivery addresses, delivery.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Accepted, ContactError> {
    if request.method() != Method::POST {
        return Err(ContactError::MethodNotAllowed);
    }

    let client = client::identify(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
    );

    incoming!(level = DEBUG, "Contact request from {}", client);

    state
        .limiter
        .check(&client)
        .map_err(|retry_after| ContactError::RateLimited { retry_after })?;

    let kind = BodyKind::from_headers(request.headers());
    let record = body::read_record(kind, request.into_body()).await?;
    let submission = Submission::from_record(&record);

    if submission.is_bot() {
        internal!(level = INFO, "Honeypot filled by {}, dropping submission", client);
        return Ok(Accepted);
    }

    submission.validate()?;

    let to = state
        .recipient()
        .ok_or(ContactError::Misconfigured("TO_EMAIL non configurata"))?;
    let from = state
        .sender()
        .ok_or(ContactError::Misconfigured("FROM_EMAIL non configurata"))?;

    let notification = OutboundMessage {
        from: from.to_string(),
        to: to.to_string(),
        reply_to: submission.email.clone(),
        subject: message::SUBJECT.to_string(),
        text: message::compose_text(&submission, &client),
    };

    let transport = state.chain.deliver(&notification).await?;

    internal!(
        level = INFO,
        "Submission from {} delivered via {}",
        client,
        transport
    );

    Ok(Accepted)
}
