use crate::domain::model::FieldValue;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;

pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Leaf(String),
    Branch(NestedTree),
}

impl TreeNode {
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            TreeNode::Leaf(value) => Some(value),
            TreeNode::Branch(_) => None,
        }
    }
}

/// Mapping built from dot-separated column names; inner segments become
/// branches, the last segment holds the cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedTree {
    entries: BTreeMap<String, TreeNode>,
}

impl NestedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from `(path, value)` pairs in iteration order.
    /// A repeated path overwrites the earlier value.
    pub fn from_flat<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tree = Self::new();
        for (path, value) in pairs {
            tree.insert_path(path.as_ref(), value.into())?;
        }
        Ok(tree)
    }

    pub fn insert_path(&mut self, path: &str, value: String) -> Result<()> {
        let (parents, leaf) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };

        let mut current = self;
        let mut walked = String::new();
        if let Some(parents) = parents {
            for segment in parents.split(PATH_SEPARATOR) {
                if !walked.is_empty() {
                    walked.push(PATH_SEPARATOR);
                }
                walked.push_str(segment);

                current = match current
                    .entries
                    .entry(segment.to_string())
                    .or_insert_with(|| TreeNode::Branch(NestedTree::new()))
                {
                    TreeNode::Branch(tree) => tree,
                    TreeNode::Leaf(_) => {
                        return Err(EtlError::PathConflict {
                            path: walked,
                            message: format!("already holds a value, cannot nest '{}' under it", path),
                        });
                    }
                };
            }
        }

        if let Some(TreeNode::Branch(_)) = current.entries.get(leaf) {
            return Err(EtlError::PathConflict {
                path: path.to_string(),
                message: "already has nested columns, cannot also hold a value".to_string(),
            });
        }

        if let Some(TreeNode::Leaf(previous)) = current
            .entries
            .insert(leaf.to_string(), TreeNode::Leaf(value))
        {
            tracing::debug!("Duplicate column '{}' overwrote value '{}'", path, previous);
        }
        Ok(())
    }

    /// Inverse of [`NestedTree::from_flat`]: every leaf with its full dot path.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for (key, node) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, PATH_SEPARATOR, key)
            };
            match node {
                TreeNode::Leaf(value) => out.push((path, value.clone())),
                TreeNode::Branch(tree) => tree.flatten_into(&path, out),
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.entries.get(key)
    }

    pub fn leaf_at(&self, path: &str) -> Option<&str> {
        let mut segments = path.split(PATH_SEPARATOR).peekable();
        let mut current = self;
        while let Some(segment) = segments.next() {
            let node = current.entries.get(segment)?;
            if segments.peek().is_none() {
                return node.as_leaf();
            }
            match node {
                TreeNode::Branch(tree) => current = tree,
                TreeNode::Leaf(_) => return None,
            }
        }
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<TreeNode> {
        self.entries.remove(key)
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, TreeNode)> {
        self.entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<TreeNode> for FieldValue {
    fn from(node: TreeNode) -> Self {
        match node {
            TreeNode::Leaf(value) => FieldValue::Text(value),
            TreeNode::Branch(tree) => FieldValue::Nested(tree.into()),
        }
    }
}

impl From<NestedTree> for BTreeMap<String, FieldValue> {
    fn from(tree: NestedTree) -> Self {
        tree.into_entries()
            .map(|(key, node)| (key, FieldValue::from(node)))
            .collect()
    }
}
