//! Cookie header handling.
//!
//! Outgoing cookies serialize as `name=value; Max-Age=<secs>; Path=<path>`
//! followed by optional `HttpOnly` / `SameSite`. Values are percent-encoded,
//! so `;`, `,`, quotes and whitespace never reach the header verbatim.
//! Incoming `Cookie` headers parse leniently: pairs without `=` are skipped
//! and values are percent-decoded.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `SameSite` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// An outgoing cookie.
///
/// A `max_age` of zero or less tells the client to discard the cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Seconds; `None` makes a browser-session cookie.
    pub max_age: Option<i64>,
    pub path: Option<String>,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// A cookie scoped to `/` with no lifetime attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            path: Some("/".to_string()),
            http_only: false,
            same_site: None,
        }
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// True when this cookie instructs the client to delete its copy.
    pub fn is_removal(&self) -> bool {
        matches!(self.max_age, Some(age) if age <= 0)
    }

    /// `Set-Cookie` header value.
    pub fn serialize(&self) -> String {
        let mut out = format!("{}={}", self.name, urlencoding::encode(&self.value));
        if let Some(age) = self.max_age {
            // Negative ages are clamped so every client reads "expire now".
            out.push_str(&format!("; Max-Age={}", age.max(0)));
        }
        if let Some(path) = &self.path {
            out.push_str(&format!("; Path={path}"));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            out.push_str(&format!("; SameSite={same_site}"));
        }
        out
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// A name/value pair received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

/// Parse a `Cookie` request header. Never fails; malformed pairs are skipped.
///
/// A value that does not percent-decode to UTF-8 is kept as sent.
pub fn parse_header(raw: &str) -> Vec<CookiePair> {
    raw.split(';')
        .filter_map(|piece| {
            let (name, value) = piece.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some(CookiePair {
                name: name.to_string(),
                value,
            })
        })
        .collect()
}

/// True if `name` is a valid RFC 6265 cookie name (an HTTP token).
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
