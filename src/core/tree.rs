use std::collections::{HashMap, HashSet};

use rusqlite::Connection;

use super::aggregation;
use crate::{
    errors::{LedgerError, LedgerResult},
    ledger::{CategoryRecord, CompositeNode},
    storage::sqlite_backend::{row_to_account, row_to_category},
};

/// Recomputes every category value once, then assembles the nested tree
/// rooted at `name` from a single snapshot of the tables.
pub fn read_tree(conn: &Connection, name: &str) -> LedgerResult<CompositeNode> {
    aggregation::recalculate(conn)?;
    let snapshot = Snapshot::load(conn)?;
    let root = snapshot
        .categories
        .values()
        .find(|category| category.name == name)
        .ok_or_else(|| LedgerError::category_not_found(name))?;
    let mut visited = HashSet::new();
    Ok(snapshot.build(root, &mut visited))
}

struct Snapshot {
    categories: HashMap<i64, CategoryRecord>,
    subcategories: HashMap<i64, Vec<i64>>,
    accounts: HashMap<i64, Vec<CompositeNode>>,
}

impl Snapshot {
    fn load(conn: &Connection) -> LedgerResult<Self> {
        let mut categories = HashMap::new();
        let mut subcategories: HashMap<i64, Vec<i64>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT id, name, value, parent_id, description FROM categories ORDER BY id",
            )?;
            for row in stmt.query_map([], row_to_category)? {
                let category = row?;
                if let Some(parent) = category.parent_id {
                    subcategories.entry(parent).or_default().push(category.id);
                }
                categories.insert(category.id, category);
            }
        }

        let mut accounts: HashMap<i64, Vec<CompositeNode>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT id, name, value, category_id, remarks, is_disabled
                 FROM enabled_accounts ORDER BY id",
            )?;
            for row in stmt.query_map([], row_to_account)? {
                let account = row?;
                accounts
                    .entry(account.category_id)
                    .or_default()
                    .push(CompositeNode::Account {
                        name: account.name,
                        value: account.value,
                        remarks: account.remarks,
                    });
            }
        }

        Ok(Self {
            categories,
            subcategories,
            accounts,
        })
    }

    fn build(&self, category: &CategoryRecord, visited: &mut HashSet<i64>) -> CompositeNode {
        visited.insert(category.id);
        let mut children = Vec::new();
        for id in self.subcategories.get(&category.id).into_iter().flatten() {
            if visited.contains(id) {
                continue;
            }
            if let Some(child) = self.categories.get(id) {
                children.push(self.build(child, visited));
            }
        }
        if let Some(accounts) = self.accounts.get(&category.id) {
            children.extend(accounts.iter().cloned());
        }
        CompositeNode::Category {
            name: category.name.clone(),
            value: category.value,
            children,
        }
    }
}
