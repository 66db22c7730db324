use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use super::users::UserController;
use super::{current_user_id, finish, internal_error, REMEMBER_EMAIL_COOKIE, USER_ID_KEY};
use crate::catalog::credentials::Credentials;
use crate::catalog::error::CatalogError;
use crate::http::{with_state, Cookie, Handler, Reply, Request, Response};
use crate::routing::{RouteError, Router};

/// Login, logout and the registration/login forms.
pub struct AuthController {
    credentials: Credentials,
    users: Arc<UserController>,
}

impl AuthController {
    pub fn new(credentials: Credentials, users: Arc<UserController>) -> Self {
        Self { credentials, users }
    }

    pub fn register_routes(self: &Arc<Self>, router: &mut Router<Handler>) -> Result<(), RouteError> {
        router.get("/register", with_state(Arc::clone(self), Self::registration_form))?;
        router.get("/login", with_state(Arc::clone(self), Self::login_form))?;
        router.post("/login", with_state(Arc::clone(self), Self::login))?;
        router.post(
            "/register",
            with_state(Arc::clone(&self.users), UserController::create_user),
        )?;
        router.get("/logout", with_state(Arc::clone(self), Self::logout))?;
        router.post("/logout", with_state(Arc::clone(self), Self::logout))?;
        Ok(())
    }

    async fn registration_form(self: Arc<Self>, req: Request, res: Response) -> Response {
        let logged_in = current_user_id(&req).is_some();
        finish(
            res,
            Reply::new(StatusCode::OK, "Registration Form")
                .template("RegistrationFormView")
                .payload(json!({
                    "title": "Registration",
                    "errorMessage": req.query_param("error"),
                    "loggedIn": logged_in,
                })),
        )
    }

    async fn login_form(self: Arc<Self>, req: Request, mut res: Response) -> Response {
        res.set_cookie(req.session_cookie());
        let remembered = req.cookie(REMEMBER_EMAIL_COOKIE).unwrap_or_default();
        finish(
            res,
            Reply::new(StatusCode::OK, "Login Form")
                .template("LoginFormView")
                .payload(json!({
                    "title": "Login",
                    "errorMessage": req.query_param("error"),
                    "rememberEmail": remembered,
                })),
        )
    }

    async fn login(self: Arc<Self>, req: Request, mut res: Response) -> Response {
        let (Some(email), Some(password)) = (req.field("email"), req.field("password")) else {
            return finish(
                res,
                Reply::new(StatusCode::BAD_REQUEST, "Email required")
                    .redirect("/login?error=Email is required"),
            );
        };

        let user = match self.credentials.login(email, password).await {
            Ok(user) => user,
            Err(CatalogError::InvalidCredentials) => {
                return finish(
                    res,
                    Reply::new(StatusCode::BAD_REQUEST, "Invalid credentials.")
                        .redirect("/login?error=Invalid credentials"),
                );
            }
            Err(e) => return internal_error(res, e),
        };

        let session = req.rotate_session();
        session.set(USER_ID_KEY, user.id);
        tracing::info!(user_id = user.id, session = %session.short_id(), "User logged in");

        res.set_cookie(req.session_cookie_for(&session));
        if req.field("rememberMe").is_some_and(|v| v != "false") {
            res.set_cookie(Cookie::new(REMEMBER_EMAIL_COOKIE, user.email.clone()));
        }

        finish(
            res,
            Reply::new(StatusCode::OK, "Logged in successfully!")
                .redirect("/")
                .payload(json!({ "user": user, "loggedIn": true })),
        )
    }

    async fn logout(self: Arc<Self>, req: Request, mut res: Response) -> Response {
        req.destroy_session();
        res.set_cookie(req.session_removal_cookie());
        finish(
            res,
            Reply::new(StatusCode::OK, "Logout successful")
                .redirect("/")
                .payload(json!({ "loggedIn": false })),
        )
    }
}
