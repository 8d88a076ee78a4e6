//! Router core module - request-time route matching.

use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

use super::radix::RadixRouter;

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Path parameters in path order.
///
/// Param names use `Arc<str>` because they come from the route tree built at startup;
/// values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A registered route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Pattern with `{name}` parameter segments, e.g. `/items/{id}`
    pub path_pattern: String,
    /// Name of the endpoint that serves this route
    pub handler_name: String,
}

impl RouteMeta {
    pub fn new(
        method: Method,
        path_pattern: impl Into<String>,
        handler_name: impl Into<String>,
    ) -> Self {
        Self {
            method,
            path_pattern: path_pattern.into(),
            handler_name: handler_name.into(),
        }
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// If a name repeats at different depths, the last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameter names in path order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.path_params.iter().map(|(k, _)| k.as_ref())
    }

    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.route.handler_name
    }
}

/// Router that matches HTTP requests to named endpoints using a radix tree
///
/// Serves two callers: the request path (matching real URLs) and the doc generator (matching
/// example URLs against the same table to discover parameter names).
#[derive(Clone)]
pub struct Router {
    radix_router: RadixRouter,
    routes: Vec<Arc<RouteMeta>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Router {
    /// Create a router from route metadata
    #[must_use]
    pub fn new(routes: Vec<RouteMeta>) -> Self {
        let mut router = Self {
            radix_router: RadixRouter::new(),
            routes: Vec::with_capacity(routes.len()),
        };
        for route in routes {
            router.insert(route);
        }

        let routes_summary: Vec<String> = router
            .routes
            .iter()
            .take(10)
            .map(|meta| format!("{} {}", meta.method, meta.path_pattern))
            .collect();
        info!(
            routes_count = router.routes.len(),
            routes_summary = ?routes_summary,
            routing_algorithm = "radix_tree",
            "Routing table loaded"
        );

        router
    }

    /// Add one route
    pub fn insert(&mut self, route: RouteMeta) {
        debug!(
            method = %route.method,
            path_pattern = %route.path_pattern,
            handler_name = %route.handler_name,
            "Route registered"
        );
        let route = Arc::new(route);
        self.radix_router.insert(Arc::clone(&route));
        self.routes.push(route);
    }

    /// Match an HTTP request to a route
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - If a matching route is found
    /// * `None` - If no route matches
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let Some((route, path_params)) = self.radix_router.route(method, path) else {
            debug!(method = %method, path = %path, "No route matched");
            return None;
        };

        debug!(
            method = %method,
            path = %path,
            handler_name = %route.handler_name,
            route_pattern = %route.path_pattern,
            path_params = ?path_params,
            "Route matched"
        );

        Some(RouteMatch { route, path_params })
    }

    /// Route registered for `method` under `handler_name`
    #[must_use]
    pub fn find_handler(&self, method: &Method, handler_name: &str) -> Option<&RouteMeta> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.handler_name == handler_name)
            .map(|r| &**r)
    }
}
