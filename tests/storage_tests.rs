mod common;

use balance_core::{
    Account, Category, CompositeNode, LedgerError, RecordKind, SqliteStorage,
};
use common::{assert_close, household_store, temp_dir, MORTGAGE};

fn value_of(store: &SqliteStorage, name: &str) -> f64 {
    store
        .get_category_by_name(name)
        .unwrap()
        .unwrap_or_else(|| panic!("category {name} missing"))
        .value
}

#[test]
fn household_totals_roll_up_through_every_level() {
    let store = household_store();
    assert_close(value_of(&store, "Traditional Savings"), common::TRADITIONAL_SAVINGS);
    assert_close(value_of(&store, "E-Savings"), common::E_SAVINGS);
    assert_close(value_of(&store, "Current Assets"), common::CURRENT_ASSETS);
    assert_close(value_of(&store, "Fixed Assets"), common::FIXED_ASSETS);
    assert_close(value_of(&store, "Assets"), common::ASSETS);
    assert_close(value_of(&store, "Liabilities"), common::LIABILITIES);
}

#[test]
fn disabled_accounts_are_excluded_until_reenabled() {
    let store = SqliteStorage::open_in_memory().unwrap();
    store.upsert_category(&Category::new("Assets")).unwrap();
    store
        .upsert_category(&Category::with_parent("Savings", "Assets"))
        .unwrap();
    store
        .upsert_account(&Account::new("SCB Bank", 503.97, "Savings"))
        .unwrap();
    store
        .upsert_account(&Account::new("Old Bank", 1000.0, "Savings").disabled())
        .unwrap();
    assert_eq!(value_of(&store, "Assets"), 503.97);

    store.enable_account("Old Bank").unwrap();
    let tree = store.get_category_tree("Assets").unwrap();
    assert_close(tree.value(), 1503.97);

    store.disable_account("Old Bank").unwrap();
    let tree = store.get_category_tree("Assets").unwrap();
    assert_eq!(tree.value(), 503.97);
    assert!(tree.find("Old Bank").is_none());
    assert_eq!(store.get_accounts(false).unwrap(), vec!["Old Bank"]);
    assert_eq!(
        store.get_all_account_names_in_category("Savings").unwrap(),
        vec!["SCB Bank", "Old Bank"]
    );
}

#[test]
fn upserting_twice_keeps_one_row_and_its_id() {
    let store = household_store();
    let before = store.get_account_by_name("K Bank").unwrap().unwrap();
    let after = store
        .upsert_account(&Account::new("K Bank", 150_000.0, "Traditional Savings"))
        .unwrap();
    assert_eq!(before.id, after.id);
    assert_eq!(after.value, 150_000.0);
    assert_close(
        value_of(&store, "Traditional Savings"),
        common::TRADITIONAL_SAVINGS - 145_253.0 + 150_000.0,
    );
    let names = store.get_accounts(true).unwrap();
    assert_eq!(names.iter().filter(|n| n.as_str() == "K Bank").count(), 1);
}

#[test]
fn identical_upserts_are_idempotent() {
    let store = household_store();
    let totals_before: Vec<f64> = store
        .get_category_names()
        .unwrap()
        .iter()
        .map(|name| value_of(&store, name))
        .collect();

    let category = Category::with_parent("E-Savings", "Current Assets").described("1M insured");
    let first = store.upsert_category(&category).unwrap();
    let second = store.upsert_category(&category).unwrap();
    assert_eq!(first, second);

    let account = Account::new("KPP Dime (high-yield)", 30_000.0, "E-Savings");
    let first = store.upsert_account(&account).unwrap();
    let second = store.upsert_account(&account).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        store.get_all_account_names_in_category("E-Savings").unwrap(),
        vec!["G-wallet (paotang)", "KPP Dime (high-yield)", "LHB You (high-yield)"]
    );

    let totals_after: Vec<f64> = store
        .get_category_names()
        .unwrap()
        .iter()
        .map(|name| value_of(&store, name))
        .collect();
    assert_eq!(totals_before.len(), totals_after.len());
    for (before, after) in totals_before.iter().zip(&totals_after) {
        assert_close(*after, *before);
    }
}

#[test]
fn unknown_parents_and_categories_violate_integrity() {
    let store = SqliteStorage::open_in_memory().unwrap();
    let err = store
        .upsert_category(&Category::with_parent("Savings", "Assets"))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::ReferentialIntegrity { kind: RecordKind::Category, ref name } if name == "Assets"
    ));

    let err = store
        .upsert_account(&Account::new("SCB Bank", 10.0, "Assets"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::ReferentialIntegrity { .. }));
    assert!(store.get_category_names().unwrap().is_empty());
    assert!(store.get_accounts(true).unwrap().is_empty());
}

#[test]
fn tree_reads_reflect_the_latest_toggles() {
    let store = household_store();
    store.disable_accounts(&["MaxValu FL3", "K Bank"]).unwrap();
    let tree = store.get_category_tree("Assets").unwrap();
    assert_close(tree.value(), common::ASSETS - 300_000.0 - 145_253.0);

    let fixed = tree.find("Fixed Assets").unwrap();
    let names: Vec<&str> = fixed.children().iter().map(CompositeNode::name).collect();
    assert_eq!(
        names,
        vec![
            "GH Bank 3-year Fixed Deposit (since 23M02)",
            "Real estate partnership equity",
            "MidSoi FL4 (co-own sis)",
            "MidSoi FL2 (co-own sis)",
        ]
    );
}

#[test]
fn tree_children_list_subcategories_before_accounts() {
    let store = household_store();
    store
        .upsert_account(&Account::new("Petty Cash", 120.0, "Current Assets"))
        .unwrap();
    let tree = store.get_category_tree("Current Assets").unwrap();
    let names: Vec<&str> = tree.children().iter().map(CompositeNode::name).collect();
    assert_eq!(names, vec!["Traditional Savings", "E-Savings", "Petty Cash"]);
    assert!(tree.children()[2].is_account());
}

#[test]
fn hierarchy_queries_follow_parent_links() {
    let store = household_store();
    assert_eq!(
        store.get_subcategories("Assets").unwrap(),
        vec!["Current Assets", "Fixed Assets"]
    );
    assert_eq!(
        store.get_leaf_categories("Assets").unwrap(),
        vec!["Traditional Savings", "E-Savings", "Fixed Assets"]
    );
    assert!(store.get_leaf_categories("Liabilities").unwrap().is_empty());
    assert_eq!(
        store.get_all_account_names_in_category("Liabilities").unwrap(),
        vec![MORTGAGE]
    );
    assert!(store.get_subcategories("Equity").unwrap_err().is_not_found());
}

#[test]
fn values_survive_close_and_reopen() {
    let path = temp_dir().join("database").join("ledger.db");
    {
        let store = SqliteStorage::open(&path).unwrap();
        common::household_ledger().persist(&store).unwrap();
        store.close().unwrap();
    }
    let store = SqliteStorage::open(&path).unwrap();
    assert_close(value_of(&store, "Assets"), common::ASSETS);
    let record = store
        .get_account_by_name("GH Bank (partnered savings)")
        .unwrap()
        .unwrap();
    assert_eq!(record.remarks.as_deref(), Some("50% of 38,754"));
    let category = store.get_category_by_name("Fixed Assets").unwrap().unwrap();
    assert_eq!(category.description.as_deref(), Some("Cannot liquidate in 1y"));
}

#[test]
fn reparenting_moves_values_between_branches() {
    let store = household_store();
    store
        .upsert_category(&Category::with_parent("E-Savings", "Fixed Assets").described("moved"))
        .unwrap();
    assert_close(
        value_of(&store, "Current Assets"),
        common::TRADITIONAL_SAVINGS,
    );
    assert_close(
        value_of(&store, "Fixed Assets"),
        common::FIXED_ASSETS + common::E_SAVINGS,
    );
    assert_close(value_of(&store, "Assets"), common::ASSETS);
}

#[test]
fn removing_an_account_refreshes_totals() {
    let store = household_store();
    store.remove_account(MORTGAGE).unwrap();
    assert_eq!(value_of(&store, "Liabilities"), 0.0);
    store.remove_category("Liabilities").unwrap();
    assert!(store.get_category_by_name("Liabilities").unwrap().is_none());
    assert!(matches!(
        store.remove_category("Assets").unwrap_err(),
        LedgerError::InvalidOperation(_)
    ));
}
