// List projection: free-text search, one categorical filter, stable sort.
// Pure over borrowed records; the stores are never touched here.

pub mod collation;
pub mod columns;
pub mod fields;
pub mod projection;
pub mod query;

pub use fields::FieldTable;
pub use projection::{project, ProjectionError};
pub use query::{ListQuery, QueryState};
