//! Reporting over composite category trees.

pub mod balance_sheet;

pub use balance_sheet::BalanceSheet;

use crate::{
    errors::LedgerResult,
    ledger::{CompositeNode, Ledger},
    storage::SqliteStorage,
};

/// Anything that can produce a fresh composite tree for a named category.
pub trait TreeSource {
    fn category_tree(&self, name: &str) -> LedgerResult<CompositeNode>;
}

impl TreeSource for SqliteStorage {
    fn category_tree(&self, name: &str) -> LedgerResult<CompositeNode> {
        self.get_category_tree(name)
    }
}

impl TreeSource for Ledger {
    fn category_tree(&self, name: &str) -> LedgerResult<CompositeNode> {
        self.to_composite(name)
    }
}
