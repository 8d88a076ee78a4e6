//! # Binder Module
//!
//! Populates request objects from HTTP requests and dispatches them to their handlers.
//!
//! ## Binding
//!
//! A [`Binder`] is registered once per request-object type. Registration reads the type's
//! layout, checks that every declared section has the capability it needs and indexes the
//! `path` and `query` fields. Per request, [`Binder::bind`]:
//!
//! 1. clones the registered template (its field values are defaults);
//! 2. converts each routed path parameter into the same-named `path` field;
//! 3. converts the first value of each query key into the `query` field with the same
//!    title-cased name;
//! 4. stops with every collected field error if anything failed;
//! 5. reads the body, rejecting it if it is longer than `max_body_bytes`, and hands it to the
//!    body decoder.
//!
//! ## Dispatch
//!
//! [`Binder::serve`] wraps binding in a `Binder::serve` span. Failed bindings are answered with
//! a JSON map such as `{"request.path.ID": "..."}`. Successful ones run
//! [`Handler::handle`](crate::capability::Handler::handle); a handler error goes to
//! `handle_error` and nothing else is written, while a success hands the `response` value to
//! the response encoder.
//!
//! [`Api`] pairs a [`Router`](crate::router::Router) with mounted binders so one call routes,
//! binds and dispatches.

mod core;
mod service;

pub use core::{Binder, BinderBuilder, SERVE_SPAN};
pub use service::{Api, Endpoint};
