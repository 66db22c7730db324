//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs subscriber (stdout, text or JSON)
//!
//! Per request:
//!     → x-request-id (http::request_id) recorded by the trace layer
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Session identifiers are only ever logged as a short prefix

pub mod logging;

pub use logging::init_logging;
