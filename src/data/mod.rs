//! Data module - CSV loading and schema normalization

mod loader;
pub mod schema;

pub use loader::{DataLoader, Dataset, LoaderError};
pub use schema::{ColumnMap, SchemaError};
