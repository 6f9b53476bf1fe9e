//! Nested key/value storage addressed by multi-part keys.
//!
//! A multi-part key such as `section.sub.value` is split on the store
//! separator and walked segment by segment through nested [`Tree`] nodes.

use crate::value::{Tree, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEPARATOR: char = '.';

/// Flattened view of a tree: one entry per leaf, keyed by its full path.
pub type FlatMap = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyStore {
    #[serde(rename = "data")]
    root: Value,
    separator: char,
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new(Tree::new())
    }
}

impl KeyStore {
    #[must_use]
    pub fn new(data: Tree) -> Self {
        Self::with_separator(data, DEFAULT_SEPARATOR)
    }

    #[must_use]
    pub const fn with_separator(data: Tree, separator: char) -> Self {
        Self {
            root: Value::Node(data),
            separator,
        }
    }

    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    pub fn set_separator(&mut self, separator: char) {
        self.separator = separator;
    }

    /// Flattens `tree` into `path -> leaf` entries, every path prefixed by
    /// `prefix` when it is non-empty. Empty nodes produce no entry.
    #[must_use]
    pub fn flatten_tree(tree: &Tree, prefix: &str, separator: char) -> FlatMap {
        let mut out = FlatMap::new();
        flatten_into(tree, prefix, separator, &mut out);
        out
    }

    /// Rebuilds a nested tree from flattened `path -> value` entries.
    #[must_use]
    pub fn unflatten(entries: &FlatMap, separator: char) -> Tree {
        let mut root = Tree::new();
        for (long_key, value) in entries {
            let parts: Vec<&str> = long_key.split(separator).collect();
            let Some((last, parents)) = parts.split_last() else {
                continue;
            };
            let mut walk = &mut root;
            for part in parents {
                walk = descend_or_create(walk, part);
            }
            walk.insert((*last).to_string(), value.clone());
        }
        root
    }

    #[must_use]
    pub fn flatten(&self) -> FlatMap {
        Self::flatten_tree(self.tree(), "", self.separator)
    }

    /// Resolves `key` to the value or sub-tree it addresses.
    ///
    /// An empty segment stops the walk and yields the node reached so far, so
    /// `a.b.` and `a.b..` resolve like `a.b`. This also applies mid-key:
    /// `a..b` yields the node at `a`, and `""` yields the whole tree.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for part in key.split(self.separator) {
            if part.is_empty() {
                break;
            }
            current = current.as_node()?.get(part)?;
        }
        Some(current)
    }

    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Writes `value` at `key`, creating intermediate nodes as needed.
    ///
    /// Empty segments are dropped anywhere in the key, unlike the lookups,
    /// which stop at the first empty segment. A scalar met on the way is
    /// replaced by a node.
    pub fn add_value(&mut self, key: &str, value: impl Into<Value>) {
        let parts: Vec<&str> = key.split(self.separator).filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return;
        };
        let mut walk = self.tree_mut();
        for part in parents {
            walk = descend_or_create(walk, part);
        }
        walk.insert((*last).to_string(), value.into());
    }

    /// Removes the value at `key`. Returns `false` when the key is absent.
    /// Ancestor nodes left empty are kept.
    pub fn remove_value(&mut self, key: &str) -> bool {
        if !self.has_key(key) {
            return false;
        }
        let parts: Vec<&str> = key.split(self.separator).filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return true;
        };
        let mut walk = self.tree_mut();
        for part in parents {
            match walk.get_mut(*part) {
                Some(Value::Node(child)) => walk = child,
                _ => return true,
            }
        }
        walk.shift_remove(*last);
        true
    }

    /// Merges `tree` under `prefix`. Each flattened entry is written only when
    /// `replace` is set or the key is neither present nor nested under a
    /// value that is already set.
    pub fn add_tree(&mut self, tree: &Tree, prefix: &str, replace: bool) {
        for (key, value) in Self::flatten_tree(tree, prefix, self.separator) {
            if replace || !(self.has_key(&key) || self.is_under_leaf(&key)) {
                self.add_value(&key, value);
            }
        }
    }

    /// Whether some ancestor of `key` holds a leaf, so writing `key` would
    /// replace that leaf with a node.
    #[must_use]
    pub fn is_under_leaf(&self, key: &str) -> bool {
        let parts: Vec<&str> = key.split(self.separator).filter(|p| !p.is_empty()).collect();
        let Some((_, parents)) = parts.split_last() else {
            return false;
        };
        let mut walk = self.tree();
        for part in parents {
            match walk.get(*part) {
                Some(Value::Node(child)) => walk = child,
                Some(_) => return true,
                None => return false,
            }
        }
        false
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        let Value::Node(tree) = &self.root else {
            unreachable!("store root is always a node")
        };
        tree
    }

    fn tree_mut(&mut self) -> &mut Tree {
        let Value::Node(tree) = &mut self.root else {
            unreachable!("store root is always a node")
        };
        tree
    }

    #[must_use]
    pub fn into_tree(self) -> Tree {
        match self.root {
            Value::Node(tree) => tree,
            _ => Tree::new(),
        }
    }

    /// Number of leaf entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot iterator over flattened entries; the store is not affected
    /// by changes made to the yielded values.
    #[must_use]
    pub fn iter(&self) -> indexmap::map::IntoIter<String, Value> {
        self.flatten().into_iter()
    }
}

fn flatten_into(tree: &Tree, prefix: &str, separator: char, out: &mut FlatMap) {
    for (key, value) in tree {
        let long_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{separator}{key}")
        };
        match value {
            Value::Node(child) => flatten_into(child, &long_key, separator, out),
            leaf => {
                out.insert(long_key, leaf.clone());
            }
        }
    }
}

fn descend_or_create<'a>(tree: &'a mut Tree, part: &str) -> &'a mut Tree {
    let slot = tree
        .entry(part.to_string())
        .or_insert_with(|| Value::Node(Tree::new()));
    if !slot.is_node() {
        *slot = Value::Node(Tree::new());
    }
    let Value::Node(child) = slot else {
        unreachable!("slot was just made a node")
    };
    child
}

impl<'a> IntoIterator for &'a KeyStore {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Deserialize)]
struct StoreRepr {
    data: serde_json::Map<String, serde_json::Value>,
    separator: char,
}

impl<'de> Deserialize<'de> for KeyStore {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = StoreRepr::deserialize(deserializer)?;
        let data = repr.data.into_iter().map(|(k, v)| (k, v.into())).collect();
        Ok(Self::with_separator(data, repr.separator))
    }
}
