//! Field-metadata registry for request-object types.
//!
//! A request object is a struct with up to four by-convention sections: `path`, `query`, `body`
//! and `response`. `#[derive(RequestObject)]` reports which sections exist as a [`Layout`];
//! `#[derive(Params)]` on the `path`/`query` structs produces one [`FieldMeta`] per field, each
//! carrying a setter closure. The binder builds its lookup indexes from the layout once, at
//! registration, so binding a request never inspects the type again.

use std::fmt;
use std::sync::Arc;

use crate::convert::{Param, Shape};
use crate::error::ConversionError;

type Setter<S> = Arc<dyn Fn(&mut S, &str) -> Result<(), ConversionError> + Send + Sync>;

/// One bindable field of a `path` or `query` section.
pub struct FieldMeta<S> {
    name: &'static str,
    shape: Shape,
    example: Option<&'static str>,
    setter: Setter<S>,
}

impl<S: 'static> FieldMeta<S> {
    /// Describe field `name` of type `T`; `set` stores a parsed value into the owning struct.
    pub fn new<T, F>(name: &'static str, example: Option<&'static str>, set: F) -> Self
    where
        T: Param,
        F: Fn(&mut S, T) + Send + Sync + 'static,
    {
        Self {
            name,
            shape: T::shape(),
            example,
            setter: Arc::new(move |target: &mut S, raw: &str| {
                set(target, T::parse(raw)?);
                Ok(())
            }),
        }
    }

    /// Re-target this field at an enclosing struct, reached through `project`.
    #[must_use]
    pub fn lift<R: 'static>(self, project: fn(&mut R) -> &mut S) -> FieldMeta<R> {
        let setter = self.setter;
        FieldMeta {
            name: self.name,
            shape: self.shape,
            example: self.example,
            setter: Arc::new(move |target: &mut R, raw: &str| setter(project(target), raw)),
        }
    }
}

impl<S> FieldMeta<S> {
    /// Declared wire name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Example annotation, used only for documentation.
    #[must_use]
    pub fn example(&self) -> Option<&'static str> {
        self.example
    }

    /// Convert `raw` and store it on `target`.
    ///
    /// # Errors
    ///
    /// The field's [`ConversionError`]; `target` is left untouched.
    pub fn set(&self, target: &mut S, raw: &str) -> Result<(), ConversionError> {
        (self.setter)(target, raw)
    }
}

impl<S> Clone for FieldMeta<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            shape: self.shape.clone(),
            example: self.example,
            setter: Arc::clone(&self.setter),
        }
    }
}

impl<S> fmt::Debug for FieldMeta<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMeta")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("example", &self.example)
            .finish_non_exhaustive()
    }
}

/// A struct whose fields bind from string-keyed sources. Implement with `#[derive(Params)]`.
pub trait Params: Sized + 'static {
    /// Field metadata in declaration order.
    fn fields() -> Vec<FieldMeta<Self>>;
}

/// A `path` or `query` section of a request object.
#[derive(Debug, Clone)]
pub struct Section<R> {
    /// Rust type name of the section struct
    pub type_name: &'static str,
    /// Example annotation on the section field itself (route pattern example for `path`)
    pub example: Option<&'static str>,
    /// Fields lifted to operate on the whole request object
    pub fields: Vec<FieldMeta<R>>,
}

impl<R: 'static> Section<R> {
    /// Build the section for field type `P`, reached from the request object via `project`.
    #[must_use]
    pub fn of<P: Params>(example: Option<&'static str>, project: fn(&mut R) -> &mut P) -> Self {
        Self {
            type_name: std::any::type_name::<P>(),
            example,
            fields: P::fields()
                .into_iter()
                .map(|field| field.lift(project))
                .collect(),
        }
    }
}

impl<R> Section<R> {
    /// Field with exactly this wire name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldMeta<R>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Which by-convention sections a request-object type declares.
#[derive(Debug, Clone)]
pub struct Layout<R> {
    /// Rust type name of the request object
    pub type_name: &'static str,
    pub path: Option<Section<R>>,
    pub query: Option<Section<R>>,
    pub has_body: bool,
    pub has_response: bool,
}

impl<R> Layout<R> {
    /// A layout with no sections.
    #[must_use]
    pub fn empty(type_name: &'static str) -> Self {
        Self {
            type_name,
            path: None,
            query: None,
            has_body: false,
            has_response: false,
        }
    }
}

/// A caller-declared request-object type. Implement with `#[derive(RequestObject)]`.
///
/// The binder clones the registered template for every request, so fields already set on the
/// template act as defaults.
pub trait RequestObject: Clone + Send + Sync + 'static {
    /// Payload type of the `body` section (`()` when absent).
    type Body;
    /// Value type of the `response` section (`()` when absent).
    type Response;

    /// Sections and field metadata; called once per registration.
    fn layout() -> Layout<Self>;

    /// The body to decode into, allocated first if the section is optional.
    fn body_slot(&mut self) -> Option<&mut Self::Body> {
        None
    }

    /// The response value, once the handler has run.
    fn response(&self) -> Option<&Self::Response> {
        None
    }
}

/// Upper-case the first letter of every word, leaving the rest untouched.
///
/// Letters, digits and `_` continue a word; anything else separates words.
#[must_use]
pub fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone)]
    struct Inner {
        id: i64,
    }

    #[derive(Debug, Default, Clone)]
    struct Outer {
        path: Inner,
    }

    impl Params for Inner {
        fn fields() -> Vec<FieldMeta<Self>> {
            vec![FieldMeta::new::<i64, _>("id", Some("5"), |s: &mut Inner, v| {
                s.id = v
            })]
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("name"), "Name");
        assert_eq!(title_case("Name"), "Name");
        assert_eq!(title_case("page_size"), "Page_size");
        assert_eq!(title_case("sort-order"), "Sort-Order");
        assert_eq!(title_case("x.y z"), "X.Y Z");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_lifted_field_sets_through_projection() {
        let section = Section::<Outer>::of::<Inner>(Some("/items/5"), |o| &mut o.path);
        assert_eq!(section.example, Some("/items/5"));
        let field = section.field("id").unwrap();
        assert_eq!(field.shape(), &Shape::Int(64));
        assert_eq!(field.example(), Some("5"));

        let mut outer = Outer::default();
        field.set(&mut outer, "42").unwrap();
        assert_eq!(outer.path.id, 42);
    }

    #[test]
    fn test_failed_set_leaves_target_untouched() {
        let field = Inner::fields().remove(0);
        let mut inner = Inner { id: 7 };
        assert!(field.set(&mut inner, "seven").is_err());
        assert_eq!(inner.id, 7);
    }
}
