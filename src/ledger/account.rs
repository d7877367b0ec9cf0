use serde::{Deserialize, Serialize};

/// An individual balance attached to exactly one category, such as cash in a
/// bank or the equity held in a property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub name: String,
    /// Balance in the ledger's single currency unit. Sign is unconstrained.
    pub value: f64,
    /// Name of the category the account sits under.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
}

impl Account {
    /// Creates an enabled account without remarks.
    pub fn new(name: impl Into<String>, value: f64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            category: category.into(),
            remarks: None,
            is_disabled: false,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_disabled = true;
        self
    }

    /// Amount the account adds to its category's roll-up.
    pub fn contribution(&self) -> f64 {
        if self.is_disabled {
            0.0
        } else {
            self.value
        }
    }
}

/// Account row as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub category_id: i64,
    pub remarks: Option<String>,
    pub is_disabled: bool,
}
