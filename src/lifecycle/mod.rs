//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build catalog + routes → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → stop accepting, drain, stop session sweep
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
