//! Purpose: Prune a `StatsTree` down to branches leading to interesting keys.
//! Exports: `MatchMode`, `filter_tree`.
//! Role: Second stage of the extract pipeline; pure, does not mutate its input.
//! Invariants: A matching key keeps its entire subtree verbatim, unpruned.
//! Invariants: Default matching is by bare segment name at any depth; the
//! opt-in path mode matches full dotted paths instead.
//! Invariants: An empty result is valid output, not an error.
use std::collections::HashSet;

use crate::core::tree::{Node, StatsTree};

/// How interest-set entries are compared against tree keys.
///
/// `Segment` reproduces the original behavior: a key named `total` at the
/// root and one nested three levels deep are treated identically. That
/// depth-independence is a known sharp edge kept for compatibility;
/// `Path` is the stricter alternative for callers who want it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum MatchMode {
    #[default]
    Segment,
    Path,
}

/// Produce a pruned copy of `tree` containing only entries whose key matches
/// `interest`, plus the branches needed to reach them.
pub fn filter_tree(tree: &StatsTree, interest: &HashSet<String>, mode: MatchMode) -> StatsTree {
    let kept = filter_level(tree, interest, mode, None);
    tracing::debug!(
        leaves_in = tree.leaf_count(),
        leaves_kept = kept.leaf_count(),
        "filtered statistics tree"
    );
    kept
}

fn filter_level(
    tree: &StatsTree,
    interest: &HashSet<String>,
    mode: MatchMode,
    prefix: Option<&str>,
) -> StatsTree {
    let mut kept = StatsTree::new();
    for (key, node) in tree {
        let full_path = match mode {
            MatchMode::Path => Some(join_path(prefix, key)),
            MatchMode::Segment => None,
        };
        let candidate = full_path.as_deref().unwrap_or(key);

        if interest.contains(candidate) {
            kept.insert(key.clone(), node.clone());
        } else if let Node::Branch(subtree) = node {
            let filtered = filter_level(subtree, interest, mode, full_path.as_deref());
            if !filtered.is_empty() {
                kept.insert(key.clone(), Node::Branch(filtered));
            }
        }
    }
    kept
}

fn join_path(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{key}"),
        None => key.to_string(),
    }
}
