use serde::{Deserialize, Serialize};

/// A named node in the accounting hierarchy. Its value is always derived from
/// the accounts and subcategories beneath it, so it is not part of the input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Name of the parent category; `None` for roots such as `Assets`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Category {
    /// Creates a root category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            description: String::new(),
        }
    }

    /// Creates a category nested under `parent`.
    pub fn with_parent(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Self::new(name)
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Category row as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
}
