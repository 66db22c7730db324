//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app with a single catch-all route
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests through the application route table
//! - Issue or clear the session cookie after the handler ran
//! - Sweep expired sessions in the background
//! - Graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue, Request as HttpRequest, StatusCode},
    routing::any,
    Router as AxumRouter,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handler::Handler;
use crate::http::request::Request;
use crate::http::request_id::MakeRequestUuid;
use crate::http::response::{Reply, Response};
use crate::routing::{Dispatch, Router};
use crate::session::SessionStore;

/// Errors from building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Serving an empty route table is a wiring mistake.
    #[error("no routes registered")]
    NoRoutes,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<Router<Handler>>,
    pub sessions: Arc<SessionStore>,
    pub max_body_bytes: usize,
}

/// HTTP server for the application.
pub struct HttpServer {
    app: AxumRouter,
    config: AppConfig,
    sessions: Arc<SessionStore>,
}

impl HttpServer {
    /// Create a server over a fully registered route table.
    pub fn new(
        config: AppConfig,
        routes: Router<Handler>,
        sessions: Arc<SessionStore>,
    ) -> Result<Self, ServerError> {
        if routes.is_empty() {
            return Err(ServerError::NoRoutes);
        }

        tracing::info!(routes = routes.len(), "Route table frozen");

        let state = AppState {
            routes: Arc::new(routes),
            sessions: Arc::clone(&sessions),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let app = Self::build_app(&config, state);
        Ok(Self {
            app,
            config,
            sessions,
        })
    }

    /// Build the axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &AppConfig, state: AppState) -> AxumRouter {
        AxumRouter::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The axum app, for driving requests without a socket.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_secs = self.config.session.sweep_interval_secs;
        if sweep_secs > 0 {
            let sessions = Arc::clone(&self.sessions);
            let stop = shutdown.resubscribe();
            tokio::spawn(sweep_sessions(sessions, Duration::from_secs(sweep_secs), stop));
        }

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Periodically drop expired sessions.
async fn sweep_sessions(
    sessions: Arc<SessionStore>,
    every: Duration,
    mut stop: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = sessions.sweep_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = sessions.len(), "Expired sessions swept");
                }
            }
            _ = stop.recv() => break,
        }
    }
}

/// Catch-all handler: route, run the matched handler, render.
async fn dispatch_handler(
    State(state): State<AppState>,
    request: HttpRequest<Body>,
) -> axum::response::Response {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();

    let matched = match state.routes.dispatch(&method, &path) {
        Dispatch::Matched(m) => m,
        Dispatch::MethodNotAllowed { allowed } => {
            tracing::debug!(method = %method, path = %path, "Method not allowed");
            let allow = allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let mut response = render(Reply::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
            if let Ok(v) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, v);
            }
            return response;
        }
        Dispatch::NotFound => {
            tracing::debug!(method = %method, path = %path, "No route matched");
            return render(Reply::new(StatusCode::NOT_FOUND, "Not Found"));
        }
    };

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Request body unreadable; treating as empty");
            Bytes::new()
        }
    };

    let req = Request::new(
        method.clone(),
        &parts.uri,
        parts.headers,
        body,
        Arc::clone(&state.sessions),
    )
    .with_params(matched.params);

    let presented = req.presented_session_id().map(str::to_string);
    let slot = req.session_slot();

    tracing::debug!(method = %method, path = %path, route = %matched.pattern, "Dispatching");
    let mut res = (matched.handler)(req, Response::new()).await;

    let cookie_name = state.sessions.cookie_name();
    if let Some(session) = slot.get() {
        if !res.has_cookie(cookie_name) {
            if session.is_destroyed() {
                if presented.is_some() {
                    res.push_cookie(state.sessions.config().removal_cookie());
                }
            } else if presented.as_deref() != Some(session.id()) {
                res.push_cookie(state.sessions.config().cookie_for(session.id()));
            }
        }
    }

    res.into_http()
}

fn render(reply: Reply) -> axum::response::Response {
    let mut res = Response::new();
    // A fresh response cannot already be sent.
    let _ = res.send(reply);
    res.into_http()
}
