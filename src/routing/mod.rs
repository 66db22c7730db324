//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     controllers call router.get/post/... (method, "/songs/:id", handler)
//!     → pattern.rs (parse template into literal / param segments)
//!     → router.rs (append to ordered table)
//!
//! Per request (method, path):
//!     → router.rs dispatch (segment-wise match)
//!     → Matched { handler, params } | MethodNotAllowed { allowed } | NotFound
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex: exact literal or single-segment parameter only
//! - Deterministic: same input always matches same route
//! - Most specific wins (fewest parameters), then first registered

pub mod pattern;
pub mod router;

use thiserror::Error;

pub use pattern::{PathParams, RoutePattern, Segment};
pub use router::{Dispatch, RouteMatch, Router};

/// Errors raised while building the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The path template could not be parsed.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Same method already has a pattern accepting exactly the same paths.
    #[error("duplicate route {method} {pattern}")]
    DuplicateRoute { method: String, pattern: String },
}
