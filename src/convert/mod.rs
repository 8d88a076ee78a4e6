//! # Convert Module
//!
//! The convert module turns wire-format strings into typed field values. It knows nothing about
//! HTTP: the same rules apply to path parameters, query parameters or any other string-keyed
//! source.
//!
//! ## Shapes
//!
//! Every bindable field declares a [`Shape`]:
//!
//! | Shape | Rust types | Rule |
//! |---|---|---|
//! | pointer | `Option<T>`, `Box<T>` | convert to `T`, wrap (never `None` on success) |
//! | sequence | `Vec<T>` | strip one `[`/`]` pair, split on `,`, convert each element |
//! | structured | `Json<T>` | deserialize the string as JSON |
//! | string | `String` | strip one leading/trailing `"` |
//! | bool | `bool` | `1 t T TRUE true True` / `0 f F FALSE false False` |
//! | integers | `i8..i64`, `isize`, `u8..u64`, `usize` | base-10 64-bit parse, then narrow |
//! | floats | `f32`, `f64` | 64-bit parse, then narrow |
//! | anything else | e.g. `HashMap<String, V>` | always [`ConversionError::Unsupported`](crate::error::ConversionError) |
//!
//! ## Usage
//!
//! ```rust
//! use brrtbind::convert::Param;
//!
//! let ids: Vec<u32> = Param::parse("[1,2,3]").unwrap();
//! assert_eq!(ids, vec![1, 2, 3]);
//!
//! let name: Option<String> = Param::parse("\"fluffy\"").unwrap();
//! assert_eq!(name.as_deref(), Some("fluffy"));
//! ```

mod core;

pub use core::{convert_value, Json, Param, Shape, Value};
