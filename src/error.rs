//! Error types for conversion, binding, registration, docs and dispatch.
//!
//! Field-level [`ConversionError`]s are never raised on their own during binding: they are
//! collected into [`ParsingErrors`] and surfaced together as [`BindError::Parsing`].

use std::collections::BTreeMap;
use std::fmt;

use http::StatusCode;
use serde::Serialize;

/// A raw string could not be coerced into the declared shape of a field.
#[derive(Debug)]
pub enum ConversionError {
    /// The text is not valid for a primitive shape (bad integer, float or boolean).
    Invalid {
        /// Declared shape, e.g. `i64`
        shape: String,
        /// The offending raw value
        value: String,
        /// Parser message
        reason: String,
    },
    /// The value parsed as a 64-bit number but does not fit the declared width.
    OutOfRange {
        /// Declared shape, e.g. `u8`
        shape: String,
        /// The offending raw value
        value: String,
    },
    /// A structured field received malformed or ill-typed JSON.
    Json {
        /// Declared shape, e.g. `struct Filter`
        shape: String,
        /// The serde_json failure
        source: serde_json::Error,
    },
    /// The shape has no conversion rule.
    Unsupported {
        /// Declared shape, e.g. `map`
        shape: String,
    },
    /// A converted value does not fit the typed field it was meant for.
    Mismatch {
        /// Shape the field expected
        expected: String,
        /// Variant that was produced
        found: &'static str,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::Invalid {
                shape,
                value,
                reason,
            } => write!(f, "parsing {value:?} as {shape}: {reason}"),
            ConversionError::OutOfRange { shape, value } => {
                write!(f, "parsing {value:?} as {shape}: value out of range")
            }
            ConversionError::Json { shape, source } => {
                write!(f, "decoding JSON into {shape}: {source}")
            }
            ConversionError::Unsupported { shape } => write!(f, "invalid type: {shape}"),
            ConversionError::Mismatch { expected, found } => {
                write!(f, "expected a {expected} value, got {found}")
            }
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConversionError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Per-field failures keyed by dotted path (`request.path.ID`, `request.query.Name`).
///
/// Serializes as a flat JSON object, which is the body of a 400 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsingErrors(BTreeMap<String, String>);

impl ParsingErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `path`. A later failure for the same path replaces the earlier one.
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }

    /// Message recorded for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(path, message)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// JSON body for the error response; `{}` if the map cannot be serialized.
    #[must_use]
    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|_| b"{}".to_vec())
    }
}

/// Binding a request onto a request object failed.
#[derive(Debug)]
pub enum BindError {
    /// One or more path/query fields failed conversion. The body was not read.
    Parsing(ParsingErrors),
    /// The body decoder capability rejected the payload, or the payload could not be read.
    Body(anyhow::Error),
    /// The payload is longer than the configured body limit. The decoder was not called.
    BodyTooLarge {
        /// Configured `max_body_bytes`
        limit: u64,
    },
}

impl BindError {
    /// The error map written to the client.
    #[must_use]
    pub fn errors(&self) -> ParsingErrors {
        let message = match self {
            BindError::Parsing(errors) => return errors.clone(),
            BindError::Body(err) => err.to_string(),
            BindError::BodyTooLarge { .. } => self.to_string(),
        };
        let mut errors = ParsingErrors::new();
        errors.insert("request.body", message);
        errors
    }

    /// Status of the error response; `default` unless the payload was too large.
    #[must_use]
    pub fn status(&self, default: StatusCode) -> StatusCode {
        match self {
            BindError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => default,
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Parsing(errors) => {
                write!(f, "input parsing error ({} field(s))", errors.len())
            }
            BindError::Body(err) => write!(f, "body decoding error: {err}"),
            BindError::BodyTooLarge { limit } => write!(f, "body exceeds {limit} bytes"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Parsing(_) | BindError::BodyTooLarge { .. } => None,
            BindError::Body(err) => Some(err.as_ref()),
        }
    }
}

/// A request-object type cannot be registered as a binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The layout declares a section whose capability was not registered.
    MissingCapability {
        /// Request-object type name
        type_name: &'static str,
        /// `body` or `response`
        section: &'static str,
        /// `BodyDecoder` or `ResponseEncoder`
        capability: &'static str,
    },
    /// Two fields of one section resolve to the same wire name.
    DuplicateField {
        /// Section type name
        type_name: &'static str,
        /// The clashing wire name
        field: String,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::MissingCapability {
                type_name,
                section,
                capability,
            } => write!(
                f,
                "{type_name} declares a `{section}` section but no {capability} was registered"
            ),
            RegistrationError::DuplicateField { type_name, field } => {
                write!(f, "{type_name} declares field `{field}` more than once")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Parameter documentation could not be generated.
#[derive(Debug)]
pub enum DocError {
    /// Every documented route needs a `path` section.
    MissingPathSection {
        /// Request-object type name
        type_name: &'static str,
    },
    /// The route declares a parameter that the `path` section lacks.
    MissingField {
        /// Section type name
        type_name: &'static str,
        /// Route parameter name
        field: String,
    },
    /// The field's shape has no schema.
    UnsupportedShape {
        /// Field name
        field: String,
        /// Shape description
        shape: String,
    },
    /// The generated fragment was rejected by the document model.
    Schema(serde_json::Error),
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocError::MissingPathSection { type_name } => {
                write!(f, "wrong struct {type_name}, `path` field expected")
            }
            DocError::MissingField { type_name, field } => {
                write!(f, "wrong path struct {type_name}, field {field} expected")
            }
            DocError::UnsupportedShape { field, shape } => {
                write!(f, "no schema for field {field} of type {shape}")
            }
            DocError::Schema(err) => write!(f, "invalid generated schema: {err}"),
        }
    }
}

impl std::error::Error for DocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DocError {
    fn from(err: serde_json::Error) -> Self {
        DocError::Schema(err)
    }
}

/// A request could not be handed to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No route matches the method and path.
    NoRoute {
        /// Request method
        method: String,
        /// Request path
        path: String,
    },
    /// The route resolved to a handler name with no mounted endpoint.
    InvalidHandlerType {
        /// Handler name from the route table
        handler_name: String,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoRoute { method, path } => write!(f, "no route for {method} {path}"),
            DispatchError::InvalidHandlerType { handler_name } => {
                write!(f, "handler `{handler_name}` is not a bindable request object")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_errors_serialize_flat() {
        let mut errors = ParsingErrors::new();
        errors.insert("request.path.ID", "bad");
        errors.insert("request.query.Name", "worse");
        let body: serde_json::Value = serde_json::from_slice(&errors.to_json_bytes()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"request.path.ID": "bad", "request.query.Name": "worse"})
        );
    }

    #[test]
    fn test_body_error_becomes_map_entry() {
        let err = BindError::Body(anyhow::anyhow!("unexpected EOF"));
        let errors = err.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("request.body"), Some("unexpected EOF"));
    }

    #[test]
    fn test_oversized_body_is_payload_too_large() {
        let err = BindError::BodyTooLarge { limit: 4 };
        assert_eq!(err.status(StatusCode::BAD_REQUEST), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.errors().get("request.body"), Some("body exceeds 4 bytes"));
        let err = BindError::Body(anyhow::anyhow!("bad"));
        assert_eq!(err.status(StatusCode::UNPROCESSABLE_ENTITY), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_registration_error_message() {
        let err = RegistrationError::MissingCapability {
            type_name: "CreateItem",
            section: "body",
            capability: "BodyDecoder",
        };
        assert_eq!(
            err.to_string(),
            "CreateItem declares a `body` section but no BodyDecoder was registered"
        );
    }
}
