//! Line splitting for the DATA stream and SASL payload encoding.

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Split on CRLF, bare LF, or bare CR.
///
/// Unlike [`str::lines`], a lone `\r` also ends a line, so nothing that
/// rejoins these with CRLF can put a bare CR on the wire. A trailing line
/// ending does not yield an empty final line.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;

    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }

        let Some(at) = rest.find(['\r', '\n']) else {
            return Some(std::mem::take(&mut rest));
        };

        let line = &rest[..at];
        let ending = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[at + ending..];
        Some(line)
    })
}

/// The `AUTH PLAIN` initial response: `\0user\0password`, encoded.
pub fn sasl_plain(username: &str, password: &str) -> String {
    let mut payload = Vec::with_capacity(username.len() + password.len() + 2);
    payload.push(0);
    payload.extend_from_slice(username.as_bytes());
    payload.push(0);
    payload.extend_from_slice(password.as_bytes());

    STANDARD.encode(payload)
}
