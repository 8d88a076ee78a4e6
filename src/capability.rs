//! Capabilities a request-object type provides to the binder.
//!
//! [`Handler`] is required for every bindable type. [`BodyDecoder`] and [`ResponseEncoder`] are
//! opted into at registration with
//! [`BinderBuilder::with_body_decoder`](crate::binder::BinderBuilder::with_body_decoder) and
//! [`BinderBuilder::with_response_encoder`](crate::binder::BinderBuilder::with_response_encoder);
//! a type that declares a `body` or `response` section without registering the matching
//! capability is rejected by `build`.

use std::io::Read;

use opentelemetry::Context;
use serde::{de::DeserializeOwned, Serialize};

use crate::registry::RequestObject;
use crate::response::{write_json_error, ResponseWriter};

/// Execute a bound request.
pub trait Handler: RequestObject {
    /// Run the request. `ctx` carries the request span.
    ///
    /// # Errors
    ///
    /// Any operational failure; it is passed to [`Handler::handle_error`] and no response
    /// encoding happens.
    fn handle(&mut self, ctx: &Context, out: &mut ResponseWriter) -> anyhow::Result<()>;

    /// Translate a failure from [`Handler::handle`] into a response.
    fn handle_error(&mut self, ctx: &Context, out: &mut ResponseWriter, err: anyhow::Error);
}

/// Custom body decoding. Called on the registered template, never on the request copy.
pub trait BodyDecoder: RequestObject {
    /// Decode `body` into `target`.
    ///
    /// # Errors
    ///
    /// Malformed payloads; the request is answered with a client error.
    fn decode_body(&self, body: &mut dyn Read, target: &mut Self::Body) -> anyhow::Result<()>;
}

/// Custom response serialization. Called on the registered template.
pub trait ResponseEncoder: RequestObject {
    fn encode_response(&self, out: &mut ResponseWriter, response: &Self::Response);
}

/// Decode a JSON payload into `target`, for [`BodyDecoder`] implementations.
///
/// # Errors
///
/// I/O or JSON errors from the payload.
pub fn decode_json<T: DeserializeOwned>(body: &mut dyn Read, target: &mut T) -> anyhow::Result<()> {
    *target = serde_json::from_reader(body)?;
    Ok(())
}

/// Encode `value` as a JSON body, for [`ResponseEncoder`] implementations.
///
/// Serialization failures become a `500` with an `{"error": ...}` body.
pub fn encode_json<T: Serialize + ?Sized>(out: &mut ResponseWriter, value: &T) {
    if let Err(err) = out.write_json(value) {
        tracing::error!(error = %err, "Failed to serialize response");
        write_json_error(
            out,
            http::StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"Failed to serialize response"}"#.to_vec(),
        );
    }
}
