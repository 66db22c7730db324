//! Request facade.
//!
//! # Responsibilities
//! - Expose parsed cookies, query parameters and path parameters
//! - Resolve the client's session once per exchange
//! - Decode the body into fields on first access
//!
//! # Design Decisions
//! - Nothing here fails on malformed input: bad cookies are skipped,
//!   bad bodies decode as empty, bad ids read as `None`
//! - The session slot is shared with the server so it can issue or clear
//!   the session cookie after the handler returns

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, Uri};

use crate::http::cookie::{parse_header, Cookie, CookiePair};
use crate::http::request_id::X_REQUEST_ID;
use crate::routing::PathParams;
use crate::session::{Session, SessionStore};

/// The session resolved for one exchange, if any.
pub type SessionSlot = Arc<OnceLock<Arc<Session>>>;

/// One inbound HTTP exchange, as seen by a handler.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    params: PathParams,
    cookies: Vec<CookiePair>,
    raw_body: Bytes,
    body: OnceLock<HashMap<String, String>>,
    sessions: Arc<SessionStore>,
    session: SessionSlot,
}

impl Request {
    pub fn new(
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: Bytes,
        sessions: Arc<SessionStore>,
    ) -> Self {
        let query = uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_header)
            .collect();

        Self {
            method,
            path: uri.path().to_string(),
            query,
            headers,
            params: PathParams::default(),
            cookies,
            raw_body: body,
            body: OnceLock::new(),
            sessions,
            session: Arc::new(OnceLock::new()),
        }
    }

    /// Attach the parameters captured by the router.
    pub fn with_params(mut self, params: PathParams) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// Every cookie the client sent, in header order.
    pub fn cookies(&self) -> &[CookiePair] {
        &self.cookies
    }

    /// Value of the first cookie named `name`.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Session identifier presented by the client, valid or not.
    pub fn presented_session_id(&self) -> Option<&str> {
        self.cookie(self.sessions.cookie_name())
            .filter(|id| !id.is_empty())
    }

    /// The session for this exchange. Resolved on first call, then memoized.
    pub fn session(&self) -> &Arc<Session> {
        self.session
            .get_or_init(|| self.sessions.resolve(self.presented_session_id()))
    }

    /// Handle the server uses to inspect the session after the handler ran.
    pub fn session_slot(&self) -> SessionSlot {
        Arc::clone(&self.session)
    }

    /// Destroy this client's session (logout).
    pub fn destroy_session(&self) {
        match self.session.get() {
            Some(session) => self.sessions.destroy(session.id()),
            None => {
                if let Some(id) = self.presented_session_id() {
                    self.sessions.destroy(id);
                }
            }
        }
    }

    /// Move this client's session data to a fresh identifier.
    ///
    /// Returns the new session. `session()` keeps returning the old, now
    /// destroyed one, so the caller must issue the cookie for the returned
    /// session itself (see `session_cookie_for`).
    pub fn rotate_session(&self) -> Arc<Session> {
        self.sessions.rotate(self.session())
    }

    /// `Set-Cookie` value carrying this exchange's session identifier.
    pub fn session_cookie(&self) -> Cookie {
        self.session_cookie_for(self.session())
    }

    pub fn session_cookie_for(&self, session: &Session) -> Cookie {
        self.sessions.config().cookie_for(session.id())
    }

    /// `Set-Cookie` value that makes the client drop its session cookie.
    pub fn session_removal_cookie(&self) -> Cookie {
        self.sessions.config().removal_cookie()
    }

    /// Body fields, decoded once on first access.
    ///
    /// `application/json` objects are flattened to strings; anything else is
    /// read as `application/x-www-form-urlencoded`. Undecodable bodies yield
    /// an empty map.
    pub fn body(&self) -> &HashMap<String, String> {
        self.body.get_or_init(|| {
            let is_json = self
                .header(header::CONTENT_TYPE.as_str())
                .is_some_and(|ct| ct.starts_with("application/json"));
            if is_json {
                decode_json_fields(&self.raw_body)
            } else {
                url::form_urlencoded::parse(&self.raw_body)
                    .into_owned()
                    .collect()
            }
        })
    }

    /// A non-empty body field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.body()
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// The `:id` path parameter as a base-10 integer.
    ///
    /// `None` when absent or not numeric. Callers still have to reject
    /// non-positive values.
    pub fn get_id(&self) -> Option<i64> {
        self.param("id").and_then(|raw| raw.parse().ok())
    }
}

fn decode_json_fields(raw: &[u8]) -> HashMap<String, String> {
    let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(raw) else {
        return HashMap::new();
    };
    map.into_iter()
        .filter_map(|(k, v)| {
            let value = match v {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((k, value))
        })
        .collect()
}
