//! Setlist: a song catalog web application.
//!
//! ```text
//!     Client ──▶ http::server (axum catch-all, request id, timeout, trace)
//!                   │
//!                   ▼
//!               routing::Router ── fewest params wins, then registration order
//!                   │
//!                   ▼
//!               catalog::controllers ◀──▶ session::SessionStore
//!                   │
//!                   ▼
//!               catalog::CatalogRepository (in memory)
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod session;

// Application
pub mod catalog;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Router;
pub use session::SessionStore;
