//! Delivery configuration.
//!
//! Every credential is optional at load time. A transport whose settings are
//! missing reports [`crate::TransportError::NotConfigured`] when asked to
//! deliver, which simply moves the chain on to the next transport.

use std::time::Duration;

use serde::Deserialize;

/// Settings for the whole delivery stage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryConfig {
    /// Envelope and header sender for notifications.
    #[serde(default)]
    pub from: Option<String>,

    /// The site owner's address.
    #[serde(default)]
    pub to: Option<String>,

    /// Primary transport.
    #[serde(default)]
    pub resend: ResendConfig,

    /// Fallback transport.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl DeliveryConfig {
    /// The sender, if set to something non-blank.
    #[must_use]
    pub fn from_address(&self) -> Option<&str> {
        non_blank(self.from.as_deref())
    }

    /// The recipient, if set to something non-blank.
    #[must_use]
    pub fn to_address(&self) -> Option<&str> {
        non_blank(self.to.as_deref())
    }
}

/// Resend HTTP API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResendConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API, without the `/emails` path.
    ///
    /// Default: `https://api.resend.com`
    #[serde(default = "defaults::resend_api_url")]
    pub api_url: String,

    /// Whole-request timeout.
    ///
    /// Default: 10 seconds
    #[serde(default = "defaults::resend_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: defaults::resend_api_url(),
            timeout_secs: defaults::resend_timeout_secs(),
        }
    }
}

impl ResendConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// SMTP submission settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: Option<String>,

    /// Port 465 means implicit TLS; anything else starts in plaintext and
    /// upgrades with STARTTLS when the server offers it.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Name announced in EHLO.
    ///
    /// Default: `localhost`
    #[serde(default = "defaults::helo_name")]
    pub helo_name: String,

    /// Refuse to authenticate over an unencrypted connection.
    #[serde(default)]
    pub require_tls: bool,

    /// Skip certificate verification. Never enable outside of testing.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default)]
    pub timeouts: SmtpTimeouts,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            password: None,
            helo_name: defaults::helo_name(),
            require_tls: false,
            accept_invalid_certs: false,
            timeouts: SmtpTimeouts::default(),
        }
    }
}

/// Host, port, username and password, present only when all four are set.
pub(crate) struct SmtpCredentials<'a> {
    pub host: &'a str,
    pub port: u16,
    pub username: &'a str,
    pub password: &'a str,
}

impl SmtpConfig {
    pub(crate) fn credentials(&self) -> Option<SmtpCredentials<'_>> {
        Some(SmtpCredentials {
            host: non_blank(self.host.as_deref())?,
            port: self.port.filter(|port| *port != 0)?,
            username: non_blank(self.username.as_deref())?,
            password: non_blank(self.password.as_deref())?,
        })
    }
}

/// Per-stage limits for the SMTP conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpTimeouts {
    /// TCP connect plus greeting (and TLS handshake on port 465).
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::connect_secs")]
    pub connect_secs: u64,

    /// Each command and its reply.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::command_secs")]
    pub command_secs: u64,

    /// Message content transfer.
    ///
    /// Default: 120 seconds
    #[serde(default = "defaults::data_secs")]
    pub data_secs: u64,
}

impl Default for SmtpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: defaults::connect_secs(),
            command_secs: defaults::command_secs(),
            data_secs: defaults::data_secs(),
        }
    }
}

impl SmtpTimeouts {
    #[must_use]
    pub const fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub const fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    #[must_use]
    pub const fn data(&self) -> Duration {
        Duration::from_secs(self.data_secs)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

mod defaults {
    pub fn resend_api_url() -> String {
        "https://api.resend.com".to_string()
    }

    pub const fn resend_timeout_secs() -> u64 {
        10
    }

    pub fn helo_name() -> String {
        "localhost".to_string()
    }

    pub const fn connect_secs() -> u64 {
        30
    }

    pub const fn command_secs() -> u64 {
        30
    }

    pub const fn data_secs() -> u64 {
        120
    }
}
