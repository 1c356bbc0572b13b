//! Purpose: Nested stats tree model shared by the parser and filter.
//! Exports: `StatsTree`, `Node`, `Leaf`, `LeafValue`.
//! Role: The in-memory shape of a parsed statistics report.
//! Invariants: Every leaf is reachable by a unique dotted path.
//! Invariants: A segment holds either a branch or a leaf, never both; later
//! writes win on collision, including a branch replacing an intermediate leaf.
//! Invariants: Serialization mirrors the tree; leaves emit `val` and `description`.
use std::collections::BTreeMap;

use serde::Serialize;

/// A leaf value is the numeric-token content of one report line. Exactly one
/// token stays a bare string; zero or many become an ordered sequence.
/// Tokens are never coerced to numbers, so the report's formatting survives.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LeafValue {
    Single(String),
    Many(Vec<String>),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Leaf {
    pub val: LeafValue,
    pub description: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Branch(StatsTree),
    Leaf(Leaf),
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatsTree(BTreeMap<String, Node>);

impl StatsTree {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: String, node: Node) {
        self.0.insert(key, node);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.0.iter()
    }

    /// Insert a leaf at a dotted key path, creating intermediate branches as
    /// needed. A leaf occupying an intermediate segment is replaced by a
    /// branch, and the final segment overwrites whatever sits there.
    pub fn insert_leaf(&mut self, dotted_key: &str, leaf: Leaf) {
        if let Some((head, rest)) = dotted_key.split_once('.') {
            let child = self
                .0
                .entry(head.to_string())
                .or_insert_with(|| Node::Branch(StatsTree::new()));
            if let Node::Leaf(_) = child {
                *child = Node::Branch(StatsTree::new());
            }
            if let Node::Branch(subtree) = child {
                subtree.insert_leaf(rest, leaf);
            }
        } else {
            self.0.insert(dotted_key.to_string(), Node::Leaf(leaf));
        }
    }

    /// Dotted paths of all leaves, in map order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths(None, &mut paths);
        paths
    }

    pub fn leaf_count(&self) -> usize {
        self.0
            .values()
            .map(|node| match node {
                Node::Leaf(_) => 1,
                Node::Branch(subtree) => subtree.leaf_count(),
            })
            .sum()
    }

    fn collect_leaf_paths(&self, prefix: Option<&str>, out: &mut Vec<String>) {
        for (key, node) in &self.0 {
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{key}"),
                None => key.clone(),
            };
            match node {
                Node::Leaf(_) => out.push(path),
                Node::Branch(subtree) => subtree.collect_leaf_paths(Some(&path), out),
            }
        }
    }
}

impl<'a> IntoIterator for &'a StatsTree {
    type Item = (&'a String, &'a Node);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Leaf, LeafValue, Node, StatsTree};
    use serde_json::json;

    fn leaf(val: &str) -> Leaf {
        Leaf {
            val: LeafValue::Single(val.to_string()),
            description: String::new(),
        }
    }

    #[test]
    fn insert_leaf_builds_nested_branches() {
        let mut tree = StatsTree::new();
        tree.insert_leaf("system.cpu.ipc", leaf("0.8"));
        tree.insert_leaf("system.cpu.cycles", leaf("100"));

        let system = match tree.get("system") {
            Some(Node::Branch(subtree)) => subtree,
            other => panic!("expected branch, got {other:?}"),
        };
        let cpu = match system.get("cpu") {
            Some(Node::Branch(subtree)) => subtree,
            other => panic!("expected branch, got {other:?}"),
        };
        assert_eq!(cpu.len(), 2);
        assert!(matches!(cpu.get("ipc"), Some(Node::Leaf(_))));
    }

    #[test]
    fn insert_leaf_overwrites_existing_leaf() {
        let mut tree = StatsTree::new();
        tree.insert_leaf("a", leaf("1"));
        tree.insert_leaf("a", leaf("2"));

        match tree.get("a") {
            Some(Node::Leaf(record)) => {
                assert_eq!(record.val, LeafValue::Single("2".to_string()));
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn intermediate_leaf_is_replaced_by_branch() {
        let mut tree = StatsTree::new();
        tree.insert_leaf("a", leaf("1"));
        tree.insert_leaf("a.b", leaf("2"));

        match tree.get("a") {
            Some(Node::Branch(subtree)) => {
                assert!(matches!(subtree.get("b"), Some(Node::Leaf(_))));
            }
            other => panic!("expected branch, got {other:?}"),
        }
    }

    #[test]
    fn leaf_paths_are_dotted_and_complete() {
        let mut tree = StatsTree::new();
        tree.insert_leaf("system.cpu.ipc", leaf("0.8"));
        tree.insert_leaf("simSeconds", leaf("0.1"));

        assert_eq!(tree.leaf_paths(), vec!["simSeconds", "system.cpu.ipc"]);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn serialization_emits_val_and_description() {
        let mut tree = StatsTree::new();
        tree.insert_leaf(
            "a.b",
            Leaf {
                val: LeafValue::Single("5".to_string()),
                description: "desc".to_string(),
            },
        );
        tree.insert_leaf(
            "x",
            Leaf {
                val: LeafValue::Many(vec!["1".to_string(), "2".to_string()]),
                description: String::new(),
            },
        );

        let value = serde_json::to_value(&tree).expect("serialize");
        assert_eq!(
            value,
            json!({
                "a": { "b": { "val": "5", "description": "desc" } },
                "x": { "val": ["1", "2"], "description": "" },
            })
        );
    }
}
