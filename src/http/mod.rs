//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request id, timeout, trace)
//!     → routing (method + path → handler, params)
//!     → request.rs (cookies, session, body, query, params)
//!     → handler (controller)
//!     → response.rs (status, JSON payload, Location, Set-Cookie)
//!     → Send to client
//! ```

pub mod cookie;
pub mod handler;
pub mod request;
pub mod request_id;
pub mod response;
pub mod server;

pub use cookie::{parse_header, Cookie, CookiePair, SameSite};
pub use handler::{handler_fn, with_state, Handler};
pub use request::Request;
pub use request_id::X_REQUEST_ID;
pub use response::{Reply, Response, ResponseError};
pub use server::{HttpServer, ServerError};
