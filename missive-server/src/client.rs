//! Client identification for rate limiting and the notification footer

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::HeaderMap};

/// Proxy headers consulted in order; the first non-empty one wins.
const FORWARDING_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "x-vercel-forwarded-for"];

/// Used when neither a proxy header nor the peer address is available
pub const UNKNOWN_CLIENT: &str = "unknown";

/// The client's address as reported by the nearest proxy, else the peer.
///
/// Only the first entry of a comma-separated list is used.
#[must_use]
pub fn identify(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    let forwarded = FORWARDING_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    });

    if let Some(value) = forwarded {
        let first = value.split(',').next().unwrap_or_default().trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    peer.map_or_else(
        || UNKNOWN_CLIENT.to_string(),
        |ConnectInfo(addr)| addr.ip().to_string(),
    )
}
