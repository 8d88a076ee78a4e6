use std::collections::{HashMap, HashSet};
use std::io::Read;

use http::request::Parts;
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use tracing::{debug, info, warn};

use crate::capability::{BodyDecoder, Handler, ResponseEncoder};
use crate::error::{BindError, ParsingErrors, RegistrationError};
use crate::registry::{title_case, FieldMeta, RequestObject, Section};
use crate::response::{write_json_error, ResponseWriter};
use crate::router::ParamVec;
use crate::runtime_config::BindConfig;

/// Span name of the dispatch wrapper.
pub const SERVE_SPAN: &str = "Binder::serve";

type DecodeFn<R> =
    fn(&R, &mut dyn Read, &mut <R as RequestObject>::Body) -> anyhow::Result<()>;
type EncodeFn<R> = fn(&R, &mut ResponseWriter, &<R as RequestObject>::Response);

/// Wire name → field, built once per registration.
type FieldIndex<R> = HashMap<String, FieldMeta<R>>;

/// Registration for a request-object type `R`.
///
/// Start from [`Binder::builder`], opt into the capabilities the type implements, then
/// [`build`](BinderBuilder::build) with the tracer the binder should report spans to.
pub struct BinderBuilder<R: Handler> {
    template: R,
    decoder: Option<DecodeFn<R>>,
    encoder: Option<EncodeFn<R>>,
    config: Option<BindConfig>,
}

impl<R: Handler> BinderBuilder<R> {
    /// Decode the `body` section with [`BodyDecoder::decode_body`].
    #[must_use]
    pub fn with_body_decoder(mut self) -> Self
    where
        R: BodyDecoder,
    {
        self.decoder = Some(<R as BodyDecoder>::decode_body);
        self
    }

    /// Serialize the `response` section with [`ResponseEncoder::encode_response`].
    #[must_use]
    pub fn with_response_encoder(mut self) -> Self
    where
        R: ResponseEncoder,
    {
        self.encoder = Some(<R as ResponseEncoder>::encode_response);
        self
    }

    /// Use `config` instead of [`BindConfig::from_env`].
    #[must_use]
    pub fn with_config(mut self, config: BindConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Resolve the layout, check capabilities and build the field indexes.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::MissingCapability`] if the type declares a `body` or `response`
    /// section without the matching capability, [`RegistrationError::DuplicateField`] if two
    /// fields of a section share a wire name.
    pub fn build<T: Tracer>(self, tracer: T) -> Result<Binder<R, T>, RegistrationError> {
        let layout = R::layout();

        if layout.has_body && self.decoder.is_none() {
            return Err(RegistrationError::MissingCapability {
                type_name: layout.type_name,
                section: "body",
                capability: "BodyDecoder",
            });
        }
        if layout.has_response && self.encoder.is_none() {
            return Err(RegistrationError::MissingCapability {
                type_name: layout.type_name,
                section: "response",
                capability: "ResponseEncoder",
            });
        }

        let path = layout
            .path
            .map(|section| index_fields(section, |name| name.to_string()))
            .transpose()?;
        let query = layout
            .query
            .map(|section| index_fields(section, title_case))
            .transpose()?;

        info!(
            request_type = layout.type_name,
            path_fields = path.as_ref().map_or(0, HashMap::len),
            query_fields = query.as_ref().map_or(0, HashMap::len),
            body_decoder = self.decoder.is_some(),
            response_encoder = self.encoder.is_some(),
            "Binder registered"
        );

        Ok(Binder {
            template: self.template,
            type_name: layout.type_name,
            path,
            query,
            decoder: self.decoder,
            encoder: self.encoder,
            config: self.config.unwrap_or_else(BindConfig::from_env),
            tracer,
        })
    }
}

fn index_fields<R>(
    section: Section<R>,
    key: impl Fn(&str) -> String,
) -> Result<FieldIndex<R>, RegistrationError> {
    let mut index = HashMap::with_capacity(section.fields.len());
    for field in section.fields {
        let wire = key(field.name());
        if index.contains_key(&wire) {
            return Err(RegistrationError::DuplicateField {
                type_name: section.type_name,
                field: wire,
            });
        }
        index.insert(wire, field);
    }
    Ok(index)
}

/// Read the whole payload, failing once it runs past `limit` bytes.
fn read_limited(body: &mut dyn Read, limit: u64) -> Result<Vec<u8>, BindError> {
    let mut payload = Vec::new();
    body.take(limit.saturating_add(1))
        .read_to_end(&mut payload)
        .map_err(|err| BindError::Body(err.into()))?;
    if payload.len() as u64 > limit {
        return Err(BindError::BodyTooLarge { limit });
    }
    Ok(payload)
}

/// Binds HTTP requests onto clones of a request-object template and dispatches them.
pub struct Binder<R: Handler, T: Tracer = BoxedTracer> {
    template: R,
    type_name: &'static str,
    path: Option<FieldIndex<R>>,
    query: Option<FieldIndex<R>>,
    decoder: Option<DecodeFn<R>>,
    encoder: Option<EncodeFn<R>>,
    config: BindConfig,
    tracer: T,
}

impl<R: Handler> Binder<R> {
    /// Start registering `template`. Fields already set on it are defaults for every request.
    #[must_use]
    pub fn builder(template: R) -> BinderBuilder<R> {
        BinderBuilder {
            template,
            decoder: None,
            encoder: None,
            config: None,
        }
    }
}

impl<R: Handler, T: Tracer> Binder<R, T> {
    /// Rust type name of the request object.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Fill a fresh copy of the template from the request.
    ///
    /// Path parameters are visited in `params` order and matched to `path` fields by exact
    /// name. Query keys are title-cased before matching `query` fields; only the first value of
    /// a repeated key is used. Every failed field is collected; if any failed, the body is not
    /// read. Each bound field is recorded as an attribute on the span in `ctx`.
    ///
    /// # Errors
    ///
    /// [`BindError::Parsing`] with one entry per failed field, [`BindError::BodyTooLarge`] if
    /// the payload is longer than `max_body_bytes`, or [`BindError::Body`] if the body decoder
    /// rejected it.
    pub fn bind(
        &self,
        parts: &Parts,
        body: &mut dyn Read,
        params: &ParamVec,
        ctx: &Context,
    ) -> Result<R, BindError> {
        let span = ctx.span();
        let mut obj = self.template.clone();
        let mut errors = ParsingErrors::new();

        if let Some(index) = &self.path {
            for (key, raw) in params {
                let Some(field) = index.get(key.as_ref()) else {
                    continue;
                };
                let attr = format!("request.path.{key}");
                match field.set(&mut obj, raw) {
                    Ok(()) => span.set_attribute(KeyValue::new(attr, raw.clone())),
                    Err(err) => errors.insert(attr, err.to_string()),
                }
            }
        }

        if let (Some(index), Some(query)) = (&self.query, parts.uri.query()) {
            let mut seen = HashSet::new();
            for (key, raw) in url::form_urlencoded::parse(query.as_bytes()) {
                let key = title_case(&key);
                if !seen.insert(key.clone()) {
                    continue;
                }
                let Some(field) = index.get(&key) else {
                    continue;
                };
                let attr = format!("request.query.{key}");
                match field.set(&mut obj, &raw) {
                    Ok(()) => span.set_attribute(KeyValue::new(attr, raw.into_owned())),
                    Err(err) => errors.insert(attr, err.to_string()),
                }
            }
        }

        if !errors.is_empty() {
            return Err(BindError::Parsing(errors));
        }

        if let Some(decode) = self.decoder {
            if let Some(target) = obj.body_slot() {
                let payload = read_limited(body, self.config.max_body_bytes)?;
                decode(&self.template, &mut payload.as_slice(), target).map_err(BindError::Body)?;
            }
        }

        Ok(obj)
    }

    /// Bind and run one request.
    ///
    /// A span named [`SERVE_SPAN`] covers the whole call. Binding failures are answered with the
    /// configured error status (`413` for an oversized payload) and a JSON error map. Otherwise the handler runs; if it fails,
    /// only [`Handler::handle_error`] writes the response, and if it succeeds the response value
    /// (when present) goes through the registered encoder.
    pub fn serve_parts(
        &self,
        parts: &Parts,
        body: &mut dyn Read,
        params: &ParamVec,
    ) -> http::Response<Vec<u8>>
    where
        T::Span: Send + Sync + 'static,
    {
        let ctx = Context::current_with_span(self.tracer.start(SERVE_SPAN));
        let mut out = ResponseWriter::new();

        match self.bind(parts, body, params, &ctx) {
            Err(err) => {
                let errors = err.errors();
                warn!(
                    request_type = self.type_name,
                    method = %parts.method,
                    path = %parts.uri.path(),
                    failed_fields = errors.len(),
                    error = %err,
                    "Request binding failed"
                );
                write_json_error(
                    &mut out,
                    err.status(self.config.error_status),
                    errors.to_json_bytes(),
                );
                let span = ctx.span();
                span.record_error(&err);
                span.set_status(Status::error(err.to_string()));
            }
            Ok(mut obj) => match obj.handle(&ctx, &mut out) {
                Err(err) => {
                    debug!(
                        request_type = self.type_name,
                        error = %err,
                        "Handler failed"
                    );
                    let span = ctx.span();
                    span.record_error(&*err);
                    span.set_status(Status::error(err.to_string()));
                    obj.handle_error(&ctx, &mut out, err);
                }
                Ok(()) => {
                    if let (Some(encode), Some(response)) = (self.encoder, obj.response()) {
                        encode(&self.template, &mut out, response);
                    }
                }
            },
        }

        ctx.span().end();
        out.into_response()
    }

    /// [`serve_parts`](Self::serve_parts) for a whole request.
    pub fn serve<B: Read>(&self, req: http::Request<B>, params: &ParamVec) -> http::Response<Vec<u8>>
    where
        T::Span: Send + Sync + 'static,
    {
        let (parts, mut body) = req.into_parts();
        self.serve_parts(&parts, &mut body, params)
    }
}
