//! Delimited tabular files keyed by human-readable column titles.

pub mod columns;
pub mod record;
pub mod schema;
pub mod store;

pub use columns::KeywordSlot;
pub use record::{Record, Table, TemplateRow};
pub use schema::TableSchema;
pub use store::{load_table, read_table, write_table, write_table_numbered};
