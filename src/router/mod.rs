//! # Router Module
//!
//! Path matching for bound endpoints. Routes are `{name}`-parameterised patterns such as
//! `/items/{id}`, stored in a radix tree keyed by segment and HTTP method.
//!
//! The router is consulted twice:
//!
//! 1. **At request time**, to resolve the endpoint and hand its path parameters to the binder.
//! 2. **At documentation time**, to match a request object's example URL against the same
//!    table and discover which parameter names the route declares.
//!
//! ## Example
//!
//! ```rust
//! use brrtbind::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Router::new(vec![RouteMeta::new(Method::GET, "/items/{id}", "get_item")]);
//!
//! let m = router.route(&Method::GET, "/items/42").unwrap();
//! assert_eq!(m.handler_name(), "get_item");
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! ```

mod core;
mod radix;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};
