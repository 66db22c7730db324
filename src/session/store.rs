//! Session registry.
//!
//! # Responsibilities
//! - Map opaque identifiers to live sessions
//! - Lookup-or-create on every exchange that touches the session
//! - Remove sessions on logout and lazily on expiry
//!
//! # Design Decisions
//! - `DashMap` shards the table so concurrent exchanges do not serialize
//! - Sessions are shared as `Arc<Session>`; per-session data has its own lock
//! - Absolute TTL from creation, measured on the monotonic clock
//! - Identifiers are 256 bits from the OS CSPRNG, hex encoded

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;

use super::value::SessionValue;
use crate::config::SessionConfig;

/// Bytes of randomness per identifier.
const SESSION_ID_BYTES: usize = 32;

/// Server-held state for one browser client.
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: Instant,
    ttl: Duration,
    destroyed: AtomicBool,
    data: RwLock<HashMap<String, SessionValue>>,
}

impl Session {
    fn new(id: String, ttl: Duration) -> Self {
        Self {
            id,
            created_at: Instant::now(),
            ttl,
            destroyed: AtomicBool::new(false),
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// First characters of the identifier, safe to log.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.age() >= self.ttl
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Neither destroyed nor expired.
    pub fn is_live(&self) -> bool {
        !self.is_destroyed() && !self.is_expired()
    }

    /// Read a value. A session that is no longer live reads as empty.
    pub fn get(&self, key: &str) -> Option<SessionValue> {
        if !self.is_live() {
            return None;
        }
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store a value. Writes to a destroyed session are dropped.
    pub fn set(&self, key: impl Into<String>, value: impl Into<SessionValue>) {
        if self.is_destroyed() {
            tracing::debug!(session = %self.short_id(), "Ignoring write to destroyed session");
            return;
        }
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<SessionValue> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Copy of the current data.
    pub fn snapshot(&self) -> HashMap<String, SessionValue> {
        if !self.is_live() {
            return HashMap::new();
        }
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn invalidate(&self) {
        self.destroyed.store(true, Ordering::Release);
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Process-wide registry of sessions, safe for concurrent use.
///
/// Also owns the session cookie settings, so every component that issues or
/// clears the session cookie agrees on its name and attributes.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
    ttl: Duration,
    config: SessionConfig,
}

impl SessionStore {
    /// A store with default cookie settings and the given TTL.
    pub fn new(ttl: Duration) -> Self {
        let config = SessionConfig {
            ttl_secs: ttl.as_secs(),
            ..SessionConfig::default()
        };
        Self {
            sessions: DashMap::new(),
            ttl,
            config,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::from_secs(config.ttl_secs),
            config: config.clone(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Name of the cookie carrying the session identifier.
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Return the live session for `session_id`, or allocate a fresh one.
    ///
    /// An unknown, destroyed or expired identifier is treated exactly like a
    /// missing one. Expired entries found here are removed.
    pub fn resolve(&self, session_id: Option<&str>) -> Arc<Session> {
        if let Some(id) = session_id {
            if let Some(session) = self.lookup(id) {
                return session;
            }
        }
        self.allocate()
    }

    /// The live session for `session_id`, without allocating.
    pub fn lookup(&self, session_id: &str) -> Option<Arc<Session>> {
        let existing = self.sessions.get(session_id).map(|e| Arc::clone(e.value()))?;

        if existing.is_live() {
            return Some(existing);
        }

        tracing::debug!(session = %existing.short_id(), "Reaping stale session");
        self.sessions
            .remove_if(session_id, |_, s| Arc::ptr_eq(s, &existing));
        existing.invalidate();
        None
    }

    /// Remove a session. Unknown identifiers are ignored.
    pub fn destroy(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            session.invalidate();
            tracing::debug!(session = %session.short_id(), "Session destroyed");
        }
    }

    /// Replace a session with a fresh identifier carrying the same data.
    ///
    /// The old identifier stops resolving. Used on login so an identifier
    /// planted before authentication never becomes an authenticated one.
    pub fn rotate(&self, session: &Session) -> Arc<Session> {
        let data = session.snapshot();
        self.destroy(session.id());
        let fresh = self.allocate();
        for (key, value) in data {
            fresh.set(key, value);
        }
        tracing::debug!(from = %session.short_id(), to = %fresh.short_id(), "Session rotated");
        fresh
    }

    pub fn is_expired(&self, session: &Session) -> bool {
        session.is_expired()
    }

    /// Drop every expired session, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| {
            let keep = session.is_live();
            if !keep {
                session.invalidate();
            }
            keep
        });
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn allocate(&self) -> Arc<Session> {
        loop {
            let id = generate_session_id();
            if let Entry::Vacant(slot) = self.sessions.entry(id.clone()) {
                let session = Arc::new(Session::new(id, self.ttl));
                slot.insert(Arc::clone(&session));
                tracing::debug!(session = %session.short_id(), "Session created");
                return session;
            }
        }
    }
}

/// A fresh identifier from the operating system's CSPRNG.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
