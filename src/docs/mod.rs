//! # Docs Module
//!
//! Generates OpenAPI parameter objects for a request-object type without touching live request
//! data. Path parameters are discovered by matching the `path` section's example URL against
//! the router, so documentation and binding read the same route table.
//!
//! Runs once per documented route, at startup or build time.

mod params;
mod schema;

pub use params::{generate_params, generate_query_params};
pub use schema::schema_for;
