//! JSON Schema fragments for field shapes.

use serde_json::{json, Value};

use crate::convert::Shape;
use crate::error::DocError;

/// Schema for a field of shape `shape`.
///
/// Pointers document their target; a `Shape::Other` has no schema.
///
/// # Errors
///
/// [`DocError::UnsupportedShape`] for [`Shape::Other`], anywhere in the shape.
pub fn schema_for(field: &str, shape: &Shape) -> Result<Value, DocError> {
    let schema = match shape {
        Shape::Pointer(inner) => return schema_for(field, inner),
        Shape::Sequence(inner) => json!({
            "type": "array",
            "items": schema_for(field, inner)?,
        }),
        Shape::Struct(name) => json!({
            "type": "object",
            "title": short_type_name(name),
        }),
        Shape::String => json!({"type": "string"}),
        Shape::Bool => json!({"type": "boolean"}),
        Shape::Int(bits) if *bits <= 32 => json!({"type": "integer", "format": "int32"}),
        Shape::Int(_) => json!({"type": "integer", "format": "int64"}),
        Shape::Uint(bits) if *bits <= 32 => {
            json!({"type": "integer", "format": "int32", "minimum": 0})
        }
        Shape::Uint(_) => json!({"type": "integer", "format": "int64", "minimum": 0}),
        Shape::Float(bits) if *bits <= 32 => json!({"type": "number", "format": "float"}),
        Shape::Float(_) => json!({"type": "number", "format": "double"}),
        Shape::Other(_) => {
            return Err(DocError::UnsupportedShape {
                field: field.to_string(),
                shape: shape.to_string(),
            })
        }
    };
    Ok(schema)
}

/// `my_crate::models::Filter` -> `Filter`
fn short_type_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}
