//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie: session_id=<id>
//!     → store.rs resolve(Some(id))
//!         live entry        → same Arc<Session>
//!         unknown/expired/destroyed → fresh Session, new id
//!     → handler reads/writes via Session::get / Session::set
//!
//! Logout:
//!     → store.rs destroy(id) (entry removed, shared Session invalidated)
//!
//! Background:
//!     → store.rs sweep_expired() on an interval (http::server)
//! ```
//!
//! # Design Decisions
//! - Store is an explicit object passed to the server, not a global
//! - Values are a closed set of scalar variants
//! - Invalid sessions read as empty so they can never look authenticated

pub mod store;
pub mod value;

pub use store::{generate_session_id, Session, SessionStore};
pub use value::SessionValue;
