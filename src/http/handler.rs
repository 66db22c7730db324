//! Handler type stored in the route table.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::request::Request;
use crate::http::response::Response;

/// A route handler: takes the exchange, returns the response it filled in.
pub type Handler = Arc<dyn Fn(Request, Response) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wrap an async function of `(Request, Response)`.
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req, res| Box::pin(f(req, res)))
}

/// Wrap an async function that also receives a clone of `state`, typically
/// an `Arc` of the controller that owns it.
pub fn with_state<S, F, Fut>(state: S, f: F) -> Handler
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S, Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req, res| Box::pin(f(state.clone(), req, res)))
}
