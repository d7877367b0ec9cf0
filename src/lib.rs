#![doc(test(attr(deny(warnings))))]

//! Balance Core keeps a personal ledger of categories and accounts, rolls
//! account balances up through the category hierarchy, and renders the result
//! as a balance sheet.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod report;
pub mod storage;
pub mod utils;

pub use errors::{LedgerError, LedgerResult, RecordKind};
pub use ledger::{Account, AccountRecord, Category, CategoryRecord, CompositeNode, Ledger};
pub use report::{BalanceSheet, TreeSource};
pub use storage::SqliteStorage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Balance Core tracing initialized.");
    });
}
