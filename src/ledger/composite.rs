use serde::{Deserialize, Serialize};

/// Transient nested read-model of a category and everything beneath it.
///
/// A category node lists its subcategories first, followed by the enabled
/// accounts attached directly to it. Serializes to the familiar
/// `{name, value, children}` / `{name, value, remarks}` shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompositeNode {
    Category {
        name: String,
        value: f64,
        children: Vec<CompositeNode>,
    },
    Account {
        name: String,
        value: f64,
        #[serde(default)]
        remarks: Option<String>,
    },
}

impl CompositeNode {
    pub fn name(&self) -> &str {
        match self {
            CompositeNode::Category { name, .. } | CompositeNode::Account { name, .. } => name,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            CompositeNode::Category { value, .. } | CompositeNode::Account { value, .. } => *value,
        }
    }

    pub fn children(&self) -> &[CompositeNode] {
        match self {
            CompositeNode::Category { children, .. } => children,
            CompositeNode::Account { .. } => &[],
        }
    }

    pub fn is_account(&self) -> bool {
        matches!(self, CompositeNode::Account { .. })
    }

    /// Depth-first search for the first node with the given name.
    pub fn find(&self, name: &str) -> Option<&CompositeNode> {
        if self.name() == name {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(name))
    }

    /// Pre-order listing of every node paired with its depth (root = 0).
    pub fn flatten(&self) -> Vec<(usize, &CompositeNode)> {
        let mut out = Vec::new();
        self.collect(0, &mut out);
        out
    }

    fn collect<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a CompositeNode)>) {
        out.push((depth, self));
        for child in self.children() {
            child.collect(depth + 1, out);
        }
    }
}
