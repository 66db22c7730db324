//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::http::cookie::{Cookie, SameSite};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Session lifetime and cookie attributes.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Largest request body read into memory; larger bodies parse as empty.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session identifier.
    pub cookie_name: String,

    /// Session lifetime from creation, in seconds.
    pub ttl_secs: u64,

    /// Interval of the background expiry sweep; 0 disables it.
    pub sweep_interval_secs: u64,

    /// `Path` attribute of the session cookie.
    pub cookie_path: String,

    /// Emit `HttpOnly` on the session cookie.
    pub http_only: bool,

    /// `SameSite` attribute of the session cookie.
    pub same_site: Option<SameSite>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session_id".to_string(),
            ttl_secs: 3600,
            sweep_interval_secs: 300,
            cookie_path: "/".to_string(),
            http_only: true,
            same_site: Some(SameSite::Lax),
        }
    }
}

impl SessionConfig {
    /// The cookie that hands `session_id` to the client.
    pub fn cookie_for(&self, session_id: &str) -> Cookie {
        let max_age = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        let cookie = Cookie::new(self.cookie_name.clone(), session_id)
            .with_max_age(max_age)
            .with_path(self.cookie_path.clone())
            .http_only(self.http_only);
        match self.same_site {
            Some(same_site) => cookie.with_same_site(same_site),
            None => cookie,
        }
    }

    /// The cookie that clears the session cookie on the client.
    pub fn removal_cookie(&self) -> Cookie {
        Cookie::new(self.cookie_name.clone(), "")
            .with_max_age(-1)
            .with_path(self.cookie_path.clone())
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Emit logs as JSON lines.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "setlist=info,tower_http=info".to_string(),
            json: false,
        }
    }
}
