//! Aggregation engine, tree reader, and path helpers shared by the store and CLI.

pub mod aggregation;
pub mod tree;
pub mod utils;

pub use aggregation::RollUpSummary;
