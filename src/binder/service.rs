use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use http::request::Parts;
use http::{Method, StatusCode};
use oas3::spec::Operation;
use opentelemetry::trace::Tracer;
use serde_json::json;
use tracing::{debug, warn};

use super::core::Binder;
use crate::capability::Handler;
use crate::docs;
use crate::error::{DispatchError, DocError};
use crate::response::{write_json_error, ResponseWriter};
use crate::router::{ParamVec, RouteMeta, Router};

/// A mounted binder with its request-object type erased.
pub trait Endpoint: Send + Sync {
    /// Rust type name of the request object.
    fn type_name(&self) -> &'static str;

    /// Run the dispatch wrapper for one routed request.
    fn serve(&self, parts: &Parts, body: &mut dyn Read, params: &ParamVec)
        -> http::Response<Vec<u8>>;

    /// Append path and query parameter docs for this endpoint's route to `op`.
    ///
    /// # Errors
    ///
    /// See [`docs::generate_params`].
    fn document(&self, router: &Router, method: &Method, op: &mut Operation)
        -> Result<(), DocError>;
}

impl<R, T> Endpoint for Binder<R, T>
where
    R: Handler,
    T: Tracer + Send + Sync,
    T::Span: Send + Sync + 'static,
{
    fn type_name(&self) -> &'static str {
        Binder::type_name(self)
    }

    fn serve(
        &self,
        parts: &Parts,
        body: &mut dyn Read,
        params: &ParamVec,
    ) -> http::Response<Vec<u8>> {
        self.serve_parts(parts, body, params)
    }

    fn document(
        &self,
        router: &Router,
        method: &Method,
        op: &mut Operation,
    ) -> Result<(), DocError> {
        docs::generate_params::<R>(router, op, method)?;
        docs::generate_query_params::<R>(op)
    }
}

/// Route table plus the endpoints its handler names resolve to.
///
/// ```rust,ignore
/// let mut api = Api::new();
/// api.route(Method::GET, "/items/{ID}", "get_item", Binder::builder(GetItem::default()).build(tracer)?);
/// let response = api.handle(request);
/// ```
#[derive(Default, Clone)]
pub struct Api {
    router: Router,
    endpoints: HashMap<String, Arc<dyn Endpoint>>,
}

impl Api {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Register `pattern` for `method` and mount `endpoint` under `handler_name`.
    pub fn route<E: Endpoint + 'static>(
        &mut self,
        method: Method,
        pattern: &str,
        handler_name: &str,
        endpoint: E,
    ) {
        self.router.insert(RouteMeta::new(method, pattern, handler_name));
        self.mount(handler_name, Arc::new(endpoint));
    }

    /// Mount `endpoint` under `handler_name`, replacing any previous one.
    pub fn mount(&mut self, handler_name: &str, endpoint: Arc<dyn Endpoint>) {
        debug!(
            handler_name = %handler_name,
            request_type = endpoint.type_name(),
            "Endpoint mounted"
        );
        self.endpoints.insert(handler_name.to_string(), endpoint);
    }

    /// Register a route whose handler is mounted separately (or not at all).
    pub fn add_route(&mut self, route: RouteMeta) {
        self.router.insert(route);
    }

    /// Route `req` and run its endpoint.
    ///
    /// Unrouted requests get a JSON `404`; a route whose handler name has no endpoint gets a
    /// JSON `500`.
    pub fn handle<B: Read>(&self, req: http::Request<B>) -> http::Response<Vec<u8>> {
        let (parts, mut body) = req.into_parts();
        match self.resolve(&parts) {
            Ok((endpoint, params)) => endpoint.serve(&parts, &mut body, &params),
            Err(err) => {
                let status = match err {
                    DispatchError::NoRoute { .. } => StatusCode::NOT_FOUND,
                    DispatchError::InvalidHandlerType { .. } => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    error = %err,
                    "Dispatch failed"
                );
                let mut out = ResponseWriter::new();
                let body = serde_json::to_vec(&json!({"error": err.to_string()}))
                    .unwrap_or_else(|_| b"{}".to_vec());
                write_json_error(&mut out, status, body);
                out.into_response()
            }
        }
    }

    fn resolve(&self, parts: &Parts) -> Result<(&dyn Endpoint, ParamVec), DispatchError> {
        let route_match = self
            .router
            .route(&parts.method, parts.uri.path())
            .ok_or_else(|| DispatchError::NoRoute {
                method: parts.method.to_string(),
                path: parts.uri.path().to_string(),
            })?;
        let endpoint = self
            .endpoints
            .get(route_match.handler_name())
            .ok_or_else(|| DispatchError::InvalidHandlerType {
                handler_name: route_match.handler_name().to_string(),
            })?;
        Ok((endpoint.as_ref(), route_match.path_params))
    }

    /// Operation doc for the endpoint mounted under `handler_name`, with its parameters.
    ///
    /// # Errors
    ///
    /// [`DocError`] from parameter generation. A handler name with no endpoint, or with no route
    /// for `method`, yields an operation without parameters.
    pub fn document(&self, method: &Method, handler_name: &str) -> Result<Operation, DocError> {
        let mut op: Operation = serde_json::from_value(json!({
            "operationId": handler_name,
            "responses": {}
        }))?;
        if self.router.find_handler(method, handler_name).is_none() {
            debug!(method = %method, handler_name = %handler_name, "No route to document");
            return Ok(op);
        }
        if let Some(endpoint) = self.endpoints.get(handler_name) {
            endpoint.document(&self.router, method, &mut op)?;
        }
        Ok(op)
    }
}
