use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use super::{current_user_id, finish, internal_error};
use crate::catalog::credentials::Credentials;
use crate::catalog::error::CatalogError;
use crate::catalog::repository::CatalogRepository;
use crate::http::{with_state, Handler, Reply, Request, Response};
use crate::routing::{RouteError, Router};

/// Account creation and the account page.
pub struct UserController {
    repo: Arc<dyn CatalogRepository>,
    credentials: Credentials,
}

impl UserController {
    pub fn new(repo: Arc<dyn CatalogRepository>, credentials: Credentials) -> Self {
        Self { repo, credentials }
    }

    pub fn register_routes(self: &Arc<Self>, router: &mut Router<Handler>) -> Result<(), RouteError> {
        router.get("/account", with_state(Arc::clone(self), Self::show_account))?;
        router.post("/users", with_state(Arc::clone(self), Self::create_user))?;
        Ok(())
    }

    /// `POST /users` and `POST /register`.
    pub async fn create_user(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(password) = req.field("password") else {
            return finish(
                res,
                Reply::new(StatusCode::BAD_REQUEST, "Missing password.")
                    .redirect("/register?error=Password required"),
            );
        };
        let Some(email) = req.field("email") else {
            return finish(
                res,
                Reply::new(StatusCode::BAD_REQUEST, "Missing email.")
                    .redirect("/register?error=Email is required"),
            );
        };
        if req.field("confirmPassword") != Some(password) {
            return finish(
                res,
                Reply::new(StatusCode::BAD_REQUEST, "Passwords do not match")
                    .redirect("/register?error=Passwords do not match"),
            );
        }
        let username = req.field("username").unwrap_or_default();

        match self.credentials.register(username, email, password).await {
            Ok(user) => finish(
                res,
                Reply::new(StatusCode::CREATED, "User created")
                    .payload(json!({ "user": user }))
                    .redirect("/login"),
            ),
            Err(CatalogError::DuplicateEmail) => finish(
                res,
                Reply::new(StatusCode::BAD_REQUEST, "User with this email already exists.")
                    .redirect("/register?error=duplicate_email"),
            ),
            Err(e) => internal_error(res, e),
        }
    }

    /// `GET /account`
    async fn show_account(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(user_id) = current_user_id(&req) else {
            return finish(
                res,
                Reply::new(StatusCode::UNAUTHORIZED, "Please log in to view your account")
                    .redirect("/login"),
            );
        };

        match self.repo.find_user_by_id(user_id).await {
            Ok(Some(user)) => finish(
                res,
                Reply::new(StatusCode::OK, "Account Details")
                    .template("AccountView")
                    .payload(json!({ "user": user, "loggedIn": true })),
            ),
            Ok(None) => finish(res, Reply::new(StatusCode::NOT_FOUND, "User not found")),
            Err(e) => internal_error(res, e),
        }
    }
}
