// ABOUTME: Persistence layer for Planboard
// ABOUTME: SQLite store with a serialized write gate, schema migration, row mapping and backups

pub mod backup;
pub mod error;
pub mod rows;
pub mod schema;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use rows::{format_timestamp, timestamp_now};
pub use schema::{MigrationReport, SCHEMA_VERSION};
pub use store::{Store, StoreConfig, WriteTxn};
