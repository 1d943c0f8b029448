//! Environment overrides applied on top of the configuration file
//!
//! | Variable               | Field                                   |
//! |------------------------|-----------------------------------------|
//! | `RATE_LIMIT_DISABLED`  | `server.rate_limit.enabled` (inverted)  |
//! | `RATE_LIMIT_WINDOW_MS` | `server.rate_limit.window_ms`           |
//! | `RATE_LIMIT_MAX`       | `server.rate_limit.max_requests`        |
//! | `RESEND_API_KEY`       | `delivery.resend.api_key`               |
//! | `FROM_EMAIL`           | `delivery.from`                         |
//! | `TO_EMAIL`             | `delivery.to`                           |
//! | `SMTP_HOST`            | `delivery.smtp.host`                    |
//! | `SMTP_PORT`            | `delivery.smtp.port`                    |
//! | `SMTP_USER`            | `delivery.smtp.username`                |
//! | `SMTP_PASS`            | `delivery.smtp.password`                |
//! | `MISSIVE_LISTEN`       | `server.listen_address`                 |
//!
//! Unset or empty variables leave the file value alone.

use missive_common::internal;

use crate::controller::Missive;

/// Apply overrides from the process environment
pub fn apply(config: &mut Missive) {
    apply_from(config, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary lookup
pub fn apply_from(config: &mut Missive, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

    let rate_limit = &mut config.server.rate_limit;

    if let Some(disabled) = var("RATE_LIMIT_DISABLED") {
        rate_limit.enabled = !disabled.eq_ignore_ascii_case("true");
    }

    if let Some(window) = var("RATE_LIMIT_WINDOW_MS") {
        rate_limit.window_ms = positive("RATE_LIMIT_WINDOW_MS", &window, rate_limit.window_ms);
    }

    if let Some(max) = var("RATE_LIMIT_MAX") {
        let current = u64::try_from(rate_limit.max_requests).unwrap_or(u64::MAX);
        rate_limit.max_requests =
            usize::try_from(positive("RATE_LIMIT_MAX", &max, current)).unwrap_or(usize::MAX);
    }

    let delivery = &mut config.delivery;

    if let Some(key) = var("RESEND_API_KEY") {
        delivery.resend.api_key = Some(key);
    }

    if let Some(from) = var("FROM_EMAIL") {
        delivery.from = Some(from);
    }

    if let Some(to) = var("TO_EMAIL") {
        delivery.to = Some(to);
    }

    if let Some(host) = var("SMTP_HOST") {
        delivery.smtp.host = Some(host);
    }

    if let Some(port) = var("SMTP_PORT") {
        delivery.smtp.port = port.trim().parse().ok();
        if delivery.smtp.port.is_none() {
            internal!(
                level = WARN,
                "Ignoring SMTP_PORT={}, not a valid port; SMTP fallback disabled",
                port
            );
        }
    }

    if let Some(user) = var("SMTP_USER") {
        delivery.smtp.username = Some(user);
    }

    if let Some(pass) = var("SMTP_PASS") {
        delivery.smtp.password = Some(pass);
    }

    if let Some(listen) = var("MISSIVE_LISTEN") {
        config.server.listen_address = listen;
    }
}

/// A finite number greater than zero, rounded up; anything else keeps
/// `current`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The value is checked to be finite and positive, and `as` saturates"
)]
fn positive(name: &str, value: &str, current: u64) -> u64 {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() && number > 0.0 => number.ceil() as u64,
        _ => {
            internal!(
                level = WARN,
                "Ignoring {}={}, expected a positive number; keeping {}",
                name,
                value,
                current
            );
            current
        }
    }
}
