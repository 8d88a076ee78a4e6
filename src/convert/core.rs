use std::collections::HashMap;
use std::fmt;
use std::num::IntErrorKind;
use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;

use crate::error::ConversionError;

/// Declared structural kind of a bindable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Nullable/owned indirection to another shape (`Option<T>`, `Box<T>`)
    Pointer(Box<Shape>),
    /// Ordered sequence (`Vec<T>`)
    Sequence(Box<Shape>),
    /// JSON-decoded structure, carrying the Rust type name
    Struct(&'static str),
    String,
    Bool,
    /// Signed integer of the given bit width
    Int(u32),
    /// Unsigned integer of the given bit width
    Uint(u32),
    /// Floating point of the given bit width
    Float(u32),
    /// Anything without a conversion rule
    Other(&'static str),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Pointer(inner) => write!(f, "*{inner}"),
            Shape::Sequence(inner) => write!(f, "[]{inner}"),
            Shape::Struct(name) => write!(f, "struct {name}"),
            Shape::String => write!(f, "string"),
            Shape::Bool => write!(f, "bool"),
            Shape::Int(bits) => write!(f, "i{bits}"),
            Shape::Uint(bits) => write!(f, "u{bits}"),
            Shape::Float(bits) => write!(f, "f{bits}"),
            Shape::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Dynamically typed result of [`convert_value`], mirroring [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Pointer(Box<Value>),
    Sequence(Vec<Value>),
    Struct(serde_json::Value),
    String(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Pointer(_) => "pointer",
            Value::Sequence(_) => "sequence",
            Value::Struct(_) => "struct",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
        }
    }
}

fn invalid(shape: &Shape, raw: &str, reason: impl fmt::Display) -> ConversionError {
    ConversionError::Invalid {
        shape: shape.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

fn out_of_range(shape: &Shape, raw: &str) -> ConversionError {
    ConversionError::OutOfRange {
        shape: shape.to_string(),
        value: raw.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Convert `raw` into a value of the given shape.
///
/// Pure and HTTP-agnostic. An empty sequence (`"[]"`) yields one element converted from the
/// empty string; there is no zero-element special case.
///
/// # Errors
///
/// Returns a [`ConversionError`] naming the shape and the value when they are incompatible,
/// and [`ConversionError::Unsupported`] for [`Shape::Other`].
pub fn convert_value(shape: &Shape, raw: &str) -> Result<Value, ConversionError> {
    match shape {
        Shape::Pointer(inner) => Ok(Value::Pointer(Box::new(convert_value(inner, raw)?))),

        Shape::Sequence(inner) => {
            let trimmed = raw.strip_prefix('[').unwrap_or(raw);
            let trimmed = trimmed.strip_suffix(']').unwrap_or(trimmed);
            trimmed
                .split(',')
                .map(|part| convert_value(inner, part))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence)
        }

        Shape::Struct(_) => {
            let json: serde_json::Value =
                serde_json::from_str(raw).map_err(|source| ConversionError::Json {
                    shape: shape.to_string(),
                    source,
                })?;
            if !json.is_object() {
                return Err(ConversionError::Json {
                    shape: shape.to_string(),
                    source: <serde_json::Error as serde::de::Error>::custom(
                        "expected a JSON object",
                    ),
                });
            }
            Ok(Value::Struct(json))
        }

        Shape::String => {
            let trimmed = raw.strip_prefix('"').unwrap_or(raw);
            let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
            Ok(Value::String(trimmed.to_string()))
        }

        Shape::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| invalid(shape, raw, "invalid syntax")),

        Shape::Int(bits) => {
            let n: i64 = raw.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(shape, raw),
                _ => invalid(shape, raw, e),
            })?;
            if *bits < 64 {
                let max = (1i64 << (bits - 1)) - 1;
                let min = -(1i64 << (bits - 1));
                if n < min || n > max {
                    return Err(out_of_range(shape, raw));
                }
            }
            Ok(Value::Int(n))
        }

        Shape::Uint(bits) => {
            let n: u64 = raw.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
                IntErrorKind::PosOverflow => out_of_range(shape, raw),
                _ => invalid(shape, raw, e),
            })?;
            if *bits < 64 && n > (1u64 << bits) - 1 {
                return Err(out_of_range(shape, raw));
            }
            Ok(Value::Uint(n))
        }

        Shape::Float(bits) => {
            let x: f64 = raw.parse().map_err(|e| invalid(shape, raw, e))?;
            if *bits == 32 {
                Ok(Value::Float(f64::from(x as f32)))
            } else {
                Ok(Value::Float(x))
            }
        }

        Shape::Other(_) => Err(ConversionError::Unsupported {
            shape: shape.to_string(),
        }),
    }
}

/// A Rust type a path or query field may have.
///
/// `parse` is the only entry point used by the binder; `shape` also feeds the doc generator.
pub trait Param: Sized {
    /// The declared shape of this type.
    fn shape() -> Shape;

    /// Move a converted value into `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Mismatch`] if `value` was produced for another shape.
    fn from_value(value: Value) -> Result<Self, ConversionError>;

    /// Convert a raw wire string into `Self`.
    ///
    /// # Errors
    ///
    /// Any [`ConversionError`] raised by [`convert_value`].
    fn parse(raw: &str) -> Result<Self, ConversionError> {
        Self::from_value(convert_value(&Self::shape(), raw)?)
    }
}

fn mismatch<T: Param>(value: &Value) -> ConversionError {
    ConversionError::Mismatch {
        expected: T::shape().to_string(),
        found: value.kind(),
    }
}

macro_rules! int_param {
    ($($ty:ty => $variant:ident($bits:expr), $value:ident;)*) => {
        $(
            impl Param for $ty {
                fn shape() -> Shape {
                    Shape::$variant($bits)
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::$value(n) => <$ty>::try_from(n).map_err(|_| {
                            ConversionError::OutOfRange {
                                shape: Self::shape().to_string(),
                                value: n.to_string(),
                            }
                        }),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

int_param! {
    i8 => Int(8), Int;
    i16 => Int(16), Int;
    i32 => Int(32), Int;
    i64 => Int(64), Int;
    isize => Int(isize::BITS), Int;
    u8 => Uint(8), Uint;
    u16 => Uint(16), Uint;
    u32 => Uint(32), Uint;
    u64 => Uint(64), Uint;
    usize => Uint(usize::BITS), Uint;
}

impl Param for f32 {
    fn shape() -> Shape {
        Shape::Float(32)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(x as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Param for f64 {
    fn shape() -> Shape {
        Shape::Float(64)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(x),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Param for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Param for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: Param> Param for Option<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Pointer(inner) => T::from_value(*inner).map(Some),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: Param> Param for Box<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Pointer(inner) => T::from_value(*inner).map(Box::new),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: Param> Param for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<V> Param for HashMap<String, V> {
    fn shape() -> Shape {
        Shape::Other("map")
    }

    fn from_value(_value: Value) -> Result<Self, ConversionError> {
        Err(ConversionError::Unsupported {
            shape: Self::shape().to_string(),
        })
    }
}

impl Param for char {
    fn shape() -> Shape {
        Shape::Other("char")
    }

    fn from_value(_value: Value) -> Result<Self, ConversionError> {
        Err(ConversionError::Unsupported {
            shape: Self::shape().to_string(),
        })
    }
}

/// A structured field: the raw string is a JSON object decoded into `T`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DeserializeOwned> Param for Json<T> {
    fn shape() -> Shape {
        Shape::Struct(std::any::type_name::<T>())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Struct(json) => {
                serde_json::from_value(json)
                    .map(Json)
                    .map_err(|source| ConversionError::Json {
                        shape: Self::shape().to_string(),
                        source,
                    })
            }
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Filter {
        field: String,
        limit: u32,
    }

    #[test]
    fn test_primitive_literals_round_trip() {
        assert!(bool::parse("true").unwrap());
        assert!(!bool::parse("false").unwrap());
        assert_eq!(i64::parse("-42").unwrap(), -42);
        assert_eq!(i8::parse("-128").unwrap(), i8::MIN);
        assert_eq!(i16::parse("32767").unwrap(), i16::MAX);
        assert_eq!(i32::parse("-7").unwrap(), -7);
        assert_eq!(isize::parse("12").unwrap(), 12);
        assert_eq!(u8::parse("255").unwrap(), u8::MAX);
        assert_eq!(u16::parse("65535").unwrap(), u16::MAX);
        assert_eq!(u32::parse("7").unwrap(), 7);
        assert_eq!(u64::parse("18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(usize::parse("3").unwrap(), 3);
        assert_eq!(f32::parse("3.5").unwrap(), 3.5f32);
        assert_eq!(f64::parse("-0.25").unwrap(), -0.25);
        assert_eq!(String::parse("hello").unwrap(), "hello");
    }

    #[test]
    fn test_bool_family() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::parse(raw).unwrap(), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::parse(raw).unwrap(), "{raw}");
        }
        assert!(matches!(
            bool::parse("yes"),
            Err(ConversionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_integer_narrowing_overflow_fails() {
        assert!(matches!(
            i8::parse("128"),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            u8::parse("256"),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            i64::parse("9223372036854775808"),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            u32::parse("-1"),
            Err(ConversionError::Invalid { .. })
        ));
        assert!(matches!(
            i32::parse("abc"),
            Err(ConversionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_float_narrowed_to_declared_precision() {
        let value = convert_value(&Shape::Float(32), "0.1").unwrap();
        assert_eq!(value, Value::Float(f64::from(0.1f32)));
        assert!(f64::parse("not-a-number").is_err());
    }

    #[test]
    fn test_string_strips_one_quote_pair() {
        assert_eq!(String::parse("\"quoted\"").unwrap(), "quoted");
        assert_eq!(String::parse("\"\"twice\"\"").unwrap(), "\"twice\"");
        assert_eq!(String::parse("a\\nb").unwrap(), "a\\nb");
    }

    #[test]
    fn test_sequence_in_split_order() {
        assert_eq!(Vec::<i64>::parse("[1,2,3]").unwrap(), vec![1, 2, 3]);
        assert_eq!(Vec::<i64>::parse("3,2,1").unwrap(), vec![3, 2, 1]);
        assert_eq!(
            Vec::<String>::parse("[a,\"b\"]").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_empty_brackets_yield_single_empty_element() {
        assert_eq!(
            convert_value(&Shape::Sequence(Box::new(Shape::String)), "[]").unwrap(),
            Value::Sequence(vec![Value::String(String::new())])
        );
        assert_eq!(Vec::<String>::parse("[]").unwrap(), vec![String::new()]);
        // the lone empty element must still convert to the element shape
        assert!(Vec::<i64>::parse("[]").is_err());
    }

    #[test]
    fn test_sequence_fails_on_first_bad_element() {
        let err = Vec::<u8>::parse("[1,x,3]").unwrap_err();
        assert!(err.to_string().contains("\"x\""), "{err}");
    }

    #[test]
    fn test_pointer_always_yields_owned_value() {
        assert_eq!(Option::<i32>::parse("5").unwrap(), Some(5));
        assert!(*Box::<bool>::parse("t").unwrap());
        assert_eq!(Option::<Vec<u8>>::parse("[1]").unwrap(), Some(vec![1]));
        assert!(Option::<i32>::parse("").is_err());
        assert_eq!(
            Option::<i32>::shape(),
            Shape::Pointer(Box::new(Shape::Int(32)))
        );
    }

    #[test]
    fn test_struct_decodes_json_object() {
        let Json(filter) = Json::<Filter>::parse(r#"{"field":"name","limit":10}"#).unwrap();
        assert_eq!(
            filter,
            Filter {
                field: "name".into(),
                limit: 10
            }
        );
    }

    #[test]
    fn test_struct_malformed_json_is_conversion_error() {
        assert!(matches!(
            Json::<Filter>::parse("{not json"),
            Err(ConversionError::Json { .. })
        ));
        assert!(matches!(
            Json::<Filter>::parse("[1,2]"),
            Err(ConversionError::Json { .. })
        ));
        assert!(matches!(
            Json::<Filter>::parse(r#"{"field":1}"#),
            Err(ConversionError::Json { .. })
        ));
    }

    #[test]
    fn test_other_shapes_unsupported() {
        assert!(matches!(
            HashMap::<String, String>::parse("{}"),
            Err(ConversionError::Unsupported { .. })
        ));
        let err = char::parse("c").unwrap_err();
        assert_eq!(err.to_string(), "invalid type: char");
    }

    #[test]
    fn test_from_value_rejects_foreign_variant() {
        assert!(matches!(
            i32::from_value(Value::Bool(true)),
            Err(ConversionError::Mismatch { found: "bool", .. })
        ));
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(Vec::<Option<u16>>::shape().to_string(), "[]*u16");
        assert_eq!(f32::shape().to_string(), "f32");
    }
}
