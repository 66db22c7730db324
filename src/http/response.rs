//! Response facade.
//!
//! # Responsibilities
//! - Accept exactly one reply per exchange
//! - Collect outgoing cookies, one `Set-Cookie` header each
//! - Render the reply as JSON with an optional `Location` header
//!
//! # Design Decisions
//! - A second `send` is refused and logged; the first reply is kept
//! - A handler that never sends produces a 500
//! - Template names are passed through, not rendered

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::cookie::Cookie;

/// Errors from misusing the response facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("a reply has already been sent for this exchange")]
    AlreadySent,
}

/// Everything a handler reports for one exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Reply {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            payload: None,
            redirect: None,
            template: None,
        }
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.template = Some(name.into());
        self
    }
}

/// Outgoing side of one exchange.
#[derive(Debug, Default)]
pub struct Response {
    reply: Option<Reply>,
    cookies: Vec<Cookie>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reply. Only the first call takes effect.
    pub fn send(&mut self, reply: Reply) -> Result<(), ResponseError> {
        if let Some(sent) = &self.reply {
            tracing::warn!(
                sent_status = %sent.status,
                sent_message = %sent.message,
                rejected_status = %reply.status,
                rejected_message = %reply.message,
                "Second reply on one exchange ignored"
            );
            return Err(ResponseError::AlreadySent);
        }
        self.reply = Some(reply);
        Ok(())
    }

    /// Append a `Set-Cookie` header. Cookies added after the reply was sent
    /// are dropped.
    pub fn set_cookie(&mut self, cookie: Cookie) {
        if self.is_sent() {
            tracing::warn!(cookie = %cookie.name, "Cookie set after reply was sent; ignored");
            return;
        }
        self.cookies.push(cookie);
    }

    pub fn is_sent(&self) -> bool {
        self.reply.is_some()
    }

    pub fn reply(&self) -> Option<&Reply> {
        self.reply.as_ref()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.reply.as_ref().map(|r| r.status)
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.iter().any(|c| c.name == name)
    }

    /// Server-side cookie injection, allowed after the reply was sent.
    pub(crate) fn push_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    /// Build the wire response.
    pub fn into_http(self) -> axum::response::Response {
        let Some(reply) = self.reply else {
            tracing::error!("Handler returned without sending a reply");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "message": "Internal Server Error" })),
            )
                .into_response();
        };

        let mut response = (reply.status, Json(&reply)).into_response();
        let headers = response.headers_mut();

        if let Some(target) = &reply.redirect {
            match HeaderValue::from_str(target) {
                Ok(v) => {
                    headers.insert(header::LOCATION, v);
                }
                Err(_) => tracing::warn!(redirect = %target, "Redirect target is not a valid header value"),
            }
        }

        for cookie in &self.cookies {
            match HeaderValue::from_str(&cookie.serialize()) {
                Ok(v) => {
                    headers.append(header::SET_COOKIE, v);
                }
                Err(_) => tracing::warn!(cookie = %cookie.name, "Cookie is not a valid header value"),
            }
        }

        response
    }
}
