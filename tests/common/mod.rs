#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use balance_core::{Account, Category, Ledger, SqliteStorage};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const TRADITIONAL_SAVINGS: f64 = 308_080.47;
pub const E_SAVINGS: f64 = 40_000.0;
pub const CURRENT_ASSETS: f64 = 348_080.47;
pub const FIXED_ASSETS: f64 = 1_115_000.0;
pub const ASSETS: f64 = 1_463_080.47;
pub const LIABILITIES: f64 = 480_465.59;
pub const MORTGAGE: &str = "1.7M Mortgage (for the partnership property)";

/// Unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Household ledger with savings, fixed assets and a mortgage.
pub fn household_ledger() -> Ledger {
    let mut ledger = Ledger::new();
    let categories = [
        Category::new("Assets"),
        Category::new("Liabilities"),
        Category::with_parent("Current Assets", "Assets"),
        Category::with_parent("Traditional Savings", "Current Assets").described("1M insured"),
        Category::with_parent("E-Savings", "Current Assets").described("1M insured"),
        Category::with_parent("Fixed Assets", "Assets").described("Cannot liquidate in 1y"),
    ];
    for category in categories {
        ledger.add_category(category).expect("add category");
    }

    let accounts = [
        Account::new("SCB Bank", 503.97, "Traditional Savings")
            .with_remarks("has SCB Easy online access"),
        Account::new("K Bank", 145_253.0, "Traditional Savings"),
        Account::new("BKK Bank", 90_744.0, "Traditional Savings"),
        Account::new("KT Bank", 42_287.0, "Traditional Savings"),
        Account::new("GH Bank (partnered savings)", 19_377.0, "Traditional Savings")
            .with_remarks("50% of 38,754"),
        Account::new("BAAC Bank (partnered savings)", 9_915.5, "Traditional Savings")
            .with_remarks("50% of 23,231"),
        Account::new("G-wallet (paotang)", 0.0, "E-Savings").with_remarks("KTBank"),
        Account::new("KPP Dime (high-yield)", 30_000.0, "E-Savings"),
        Account::new("LHB You (high-yield)", 10_000.0, "E-Savings"),
        Account::new(
            "GH Bank 3-year Fixed Deposit (since 23M02)",
            300_000.0,
            "Fixed Assets",
        )
        .with_remarks("2.25% semiannual"),
        Account::new("Real estate partnership equity", 250_000.0, "Fixed Assets")
            .with_remarks("50% of the 500,000 down payment of 2.2M Baht house"),
        Account::new("MaxValu FL3", 300_000.0, "Fixed Assets"),
        Account::new("MidSoi FL4 (co-own sis)", 150_000.0, "Fixed Assets")
            .with_remarks("50% of 300,000"),
        Account::new("MidSoi FL2 (co-own sis)", 115_000.0, "Fixed Assets")
            .with_remarks("50% of 230,000"),
        Account::new(MORTGAGE, 480_465.59, "Liabilities").with_remarks("50% of 960,931.18"),
    ];
    for account in accounts {
        ledger.add_account(account).expect("add account");
    }
    ledger
}

/// In-memory store holding the household ledger.
pub fn household_store() -> SqliteStorage {
    let store = SqliteStorage::open_in_memory().expect("open in-memory store");
    household_ledger().persist(&store).expect("persist ledger");
    store
}
