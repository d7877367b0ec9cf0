//! Durable storage for categories and accounts.

pub mod schema;
pub mod sqlite_backend;

pub use sqlite_backend::SqliteStorage;
