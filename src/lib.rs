//! # brrtbind
//!
//! **brrtbind** binds HTTP requests onto typed request objects and documents their parameters
//! as OpenAPI.
//!
//! ## Overview
//!
//! A request object is a plain struct with up to four sections, recognised by field name:
//!
//! - `path` - filled from the router's path parameters, matched by exact name
//! - `query` - filled from the URL query string, matched by title-cased name
//! - `body` - handed to the type's [`BodyDecoder`](capability::BodyDecoder)
//! - `response` - set by the handler and written by its [`ResponseEncoder`](capability::ResponseEncoder)
//!
//! Field metadata comes from `#[derive(Params)]` and `#[derive(RequestObject)]` and is indexed
//! once when a [`Binder`](binder::Binder) is built. Every request then clones the registered
//! template, converts each string value according to the field's [`Shape`](convert::Shape), and
//! either reports all failing fields together or runs the handler.
//!
//! ## Architecture
//!
//! - **[`convert`]** - string to typed value conversion
//! - **[`registry`]** - field metadata and request-object layouts
//! - **[`capability`]** - handler, body decoder and response encoder traits
//! - **[`binder`]** - binding, the dispatch wrapper and the [`Api`](binder::Api) facade
//! - **[`router`]** - radix-tree route matching shared by dispatch and docs
//! - **[`docs`]** - OpenAPI parameter generation
//! - **[`response`]** - buffered response writer
//! - **[`error`]** - error types
//! - **[`runtime_config`]** - environment configuration
//! - **[`otel`]** - logging setup and tracer naming
//!
//! ## Example
//!
//! ```rust
//! use brrtbind::binder::Api;
//! use brrtbind::capability::Handler;
//! use brrtbind::response::ResponseWriter;
//! use brrtbind::{Binder, Params, RequestObject};
//! use http::Method;
//! use opentelemetry::trace::noop::NoopTracer;
//! use opentelemetry::Context;
//!
//! #[derive(Clone, Default, Params)]
//! struct ItemPath {
//!     #[param(rename = "ID", example = "5")]
//!     id: i64,
//! }
//!
//! #[derive(Clone, Default, RequestObject)]
//! struct GetItem {
//!     #[request(example = "/items/5")]
//!     path: ItemPath,
//! }
//!
//! impl Handler for GetItem {
//!     fn handle(&mut self, _ctx: &Context, out: &mut ResponseWriter) -> anyhow::Result<()> {
//!         out.write_json(&serde_json::json!({ "id": self.path.id }))?;
//!         Ok(())
//!     }
//!
//!     fn handle_error(&mut self, _ctx: &Context, _out: &mut ResponseWriter, _err: anyhow::Error) {}
//! }
//!
//! let binder = Binder::builder(GetItem::default())
//!     .build(NoopTracer::new())
//!     .unwrap();
//! let mut api = Api::new();
//! api.route(Method::GET, "/items/{ID}", "get_item", binder);
//!
//! let request = http::Request::get("/items/42").body(std::io::empty()).unwrap();
//! let response = api.handle(request);
//! assert_eq!(response.body(), br#"{"id":42}"#);
//!
//! let request = http::Request::get("/items/abc").body(std::io::empty()).unwrap();
//! assert_eq!(api.handle(request).status(), 400);
//! ```

extern crate self as brrtbind;

pub mod binder;
pub mod capability;
pub mod convert;
pub mod docs;
pub mod error;
pub mod otel;
pub mod registry;
pub mod response;
pub mod router;
pub mod runtime_config;

pub use binder::{Api, Binder};
pub use brrtbind_macros::{Params, RequestObject};
pub use error::{BindError, ConversionError, DocError, ParsingErrors, RegistrationError};
