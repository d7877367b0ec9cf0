use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{account::Account, category::Category, composite::CompositeNode};
use crate::errors::{LedgerError, LedgerResult};
use crate::storage::SqliteStorage;

/// In-memory ledger used before anything is persisted.
///
/// Categories and accounts are owned by the ledger and refer to their parent by
/// name; children are derived by lookup, so there is no back-reference between
/// a parent and its children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    accounts: Vec<Account>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category under its parent. The parent must already be part
    /// of the ledger, which keeps insertion order parent-first.
    pub fn add_category(&mut self, category: Category) -> LedgerResult<()> {
        validate_name(&category.name)?;
        if self.category(&category.name).is_some() {
            return Err(LedgerError::Validation(format!(
                "Category `{}` already exists",
                category.name
            )));
        }
        if let Some(parent) = category.parent.as_deref() {
            if self.category(parent).is_none() {
                return Err(LedgerError::missing_category(parent));
            }
        }
        self.categories.push(category);
        Ok(())
    }

    /// Registers an account under its category.
    pub fn add_account(&mut self, account: Account) -> LedgerResult<()> {
        validate_name(&account.name)?;
        if self.account(&account.name).is_some() {
            return Err(LedgerError::Validation(format!(
                "Account `{}` already exists",
                account.name
            )));
        }
        if self.category(&account.category).is_none() {
            return Err(LedgerError::missing_category(&account.category));
        }
        self.accounts.push(account);
        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.name == name)
    }

    pub fn account_mut(&mut self, name: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.name == name)
    }

    pub fn subcategories<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Category> + 'a {
        self.categories
            .iter()
            .filter(move |category| category.parent.as_deref() == Some(name))
    }

    pub fn accounts_in<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Account> + 'a {
        self.accounts
            .iter()
            .filter(move |account| account.category == name)
    }

    /// Sum of enabled accounts directly attached plus every subcategory value.
    pub fn category_value(&self, name: &str) -> LedgerResult<f64> {
        if self.category(name).is_none() {
            return Err(LedgerError::category_not_found(name));
        }
        Ok(self.value_of(name))
    }

    fn value_of(&self, name: &str) -> f64 {
        self.value_within(name, &mut HashSet::new())
    }

    /// Deserialized ledgers skip the `add_*` checks, so a category already on
    /// the current path contributes nothing.
    fn value_within<'a>(&'a self, name: &'a str, visited: &mut HashSet<&'a str>) -> f64 {
        if !visited.insert(name) {
            return 0.0;
        }
        let own = self
            .accounts_in(name)
            .fold(0.0, |total, account| total + account.contribution());
        let total = self.subcategories(name).fold(own, |total, child| {
            total + self.value_within(&child.name, visited)
        });
        visited.remove(name);
        total
    }

    /// Builds the same nested shape the store's tree reader emits.
    pub fn to_composite(&self, name: &str) -> LedgerResult<CompositeNode> {
        if self.category(name).is_none() {
            return Err(LedgerError::category_not_found(name));
        }
        Ok(self.composite_of(name, &mut HashSet::new()))
    }

    fn composite_of<'a>(&'a self, name: &'a str, visited: &mut HashSet<&'a str>) -> CompositeNode {
        visited.insert(name);
        let mut children = Vec::new();
        for child in self.subcategories(name) {
            if visited.contains(child.name.as_str()) {
                continue;
            }
            children.push(self.composite_of(&child.name, visited));
        }
        children.extend(
            self.accounts_in(name)
                .filter(|account| !account.is_disabled)
                .map(|account| CompositeNode::Account {
                    name: account.name.clone(),
                    value: account.value,
                    remarks: account.remarks.clone(),
                }),
        );
        visited.remove(name);
        CompositeNode::Category {
            name: name.to_string(),
            value: self.value_of(name),
            children,
        }
    }

    /// Writes every category (parents first) and then every account to the store.
    pub fn persist(&self, store: &SqliteStorage) -> LedgerResult<()> {
        for category in &self.categories {
            store.upsert_category(category)?;
        }
        for account in &self.accounts {
            store.upsert_account(account)?;
        }
        tracing::info!(
            categories = self.categories.len(),
            accounts = self.accounts.len(),
            "Persisted in-memory ledger"
        );
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        Err(LedgerError::Validation("name must not be empty".into()))
    } else if name.trim() != name {
        Err(LedgerError::Validation(format!(
            "name `{name}` must not start or end with whitespace"
        )))
    } else {
        Ok(())
    }
}
