//! Route table and dispatch.
//!
//! # Responsibilities
//! - Store (method, pattern) → handler registrations in order
//! - Select the most specific matching route for a request
//! - Report path-matched-but-wrong-method separately from no match
//!
//! # Design Decisions
//! - Immutable after startup; dispatch takes `&self` and needs no locking
//! - Fewest parameter segments wins, then registration order
//! - O(n) scan over routes (acceptable for an application-sized table)

use axum::http::Method;

use super::pattern::{split_path, PathParams, RoutePattern};
use super::RouteError;

#[derive(Debug)]
struct Route<H> {
    method: Method,
    pattern: RoutePattern,
    handler: H,
}

/// Ordered registry of routes, generic over the handler type.
#[derive(Debug)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
}

/// A successful match.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    pub pattern: &'a RoutePattern,
    pub params: PathParams,
}

/// Outcome of [`Router::dispatch`]. Unmatched requests are values, never errors.
#[derive(Debug)]
pub enum Dispatch<'a, H> {
    Matched(RouteMatch<'a, H>),
    /// The path matched, but only under these other methods.
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

impl<'a, H> Dispatch<'a, H> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Dispatch::Matched(_))
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route. Rejects malformed templates and a second registration of
    /// the same method with an identically shaped pattern.
    pub fn register(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), RouteError> {
        let pattern = RoutePattern::parse(pattern)?;

        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.pattern.same_shape(&pattern))
        {
            return Err(RouteError::DuplicateRoute {
                method: method.to_string(),
                pattern: pattern.to_string(),
            });
        }

        tracing::debug!(method = %method, pattern = %pattern, "Route registered");
        self.routes.push(Route {
            method,
            pattern,
            handler,
        });
        Ok(())
    }

    pub fn get(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.register(Method::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.register(Method::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.register(Method::PUT, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.register(Method::PATCH, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.register(Method::DELETE, pattern, handler)
    }

    /// Match `method` + `path` against the table.
    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch<'_, H> {
        let concrete: Vec<&str> = split_path(path).collect();

        let mut best: Option<(&Route<H>, PathParams)> = None;
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.pattern.match_segments(&concrete) else {
                continue;
            };

            if route.method != *method {
                if !allowed.contains(&route.method) {
                    allowed.push(route.method.clone());
                }
                continue;
            }

            // Strictly fewer parameters replaces; ties keep the earlier route.
            let better = match &best {
                Some((current, _)) => route.pattern.param_count() < current.pattern.param_count(),
                None => true,
            };
            if better {
                best = Some((route, params));
            }
        }

        match best {
            Some((route, params)) => Dispatch::Matched(RouteMatch {
                handler: &route.handler,
                pattern: &route.pattern,
                params,
            }),
            None if !allowed.is_empty() => Dispatch::MethodNotAllowed { allowed },
            None => Dispatch::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered routes as (method, template) pairs, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes.iter().map(|r| (&r.method, r.pattern.as_str()))
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}
