//! Request handlers for the song catalog.
//!
//! # Data Flow
//! ```text
//! Router::dispatch → Handler (with_state(controller, method))
//!     → Request: session userId, body fields, :id
//!     → Credentials / CatalogRepository
//!     → Response::send(Reply) exactly once, then return
//! ```
//!
//! # Design Decisions
//! - Every early exit goes through `finish`, which sends and hands the
//!   response back, so no code path can keep running after a send
//! - Ids that are missing, non-numeric, zero or negative answer 400

mod auth;
mod reviews;
mod songs;
mod users;

use std::sync::Arc;

use axum::http::StatusCode;

pub use auth::AuthController;
pub use reviews::ReviewController;
pub use songs::SongController;
pub use users::UserController;

use crate::catalog::credentials::{Credentials, PasswordHasher};
use crate::catalog::error::CatalogError;
use crate::catalog::repository::CatalogRepository;
use crate::http::{Handler, Reply, Request, Response};
use crate::routing::{RouteError, Router};

/// Session key holding the logged-in user's id.
pub const USER_ID_KEY: &str = "userId";

/// Cookie remembering the last email used to log in.
pub const REMEMBER_EMAIL_COOKIE: &str = "email";

/// Build the full application route table.
pub fn build_routes(
    repo: Arc<dyn CatalogRepository>,
    hasher: Arc<dyn PasswordHasher>,
) -> Result<Router<Handler>, RouteError> {
    let credentials = Credentials::new(Arc::clone(&repo), hasher);

    let users = Arc::new(UserController::new(Arc::clone(&repo), credentials.clone()));
    let auth = Arc::new(AuthController::new(credentials, Arc::clone(&users)));
    let songs = Arc::new(SongController::new(Arc::clone(&repo)));
    let reviews = Arc::new(ReviewController::new(repo));

    let mut router = Router::new();
    auth.register_routes(&mut router)?;
    users.register_routes(&mut router)?;
    songs.register_routes(&mut router)?;
    reviews.register_routes(&mut router)?;
    Ok(router)
}

/// Send `reply` and hand the response back to the dispatcher.
fn finish(mut res: Response, reply: Reply) -> Response {
    // A second send is logged and ignored by Response itself.
    let _ = res.send(reply);
    res
}

/// 500 for storage failures that are not the client's fault.
fn internal_error(res: Response, err: CatalogError) -> Response {
    tracing::error!(error = %err, "Catalog operation failed");
    finish(
        res,
        Reply::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
    )
}

/// The `:id` parameter when it is a positive integer.
fn positive_id(req: &Request) -> Option<i64> {
    req.get_id().filter(|id| *id > 0)
}

/// Id of the logged-in user, if any.
fn current_user_id(req: &Request) -> Option<i64> {
    req.session().get(USER_ID_KEY).and_then(|v| v.as_int())
}
