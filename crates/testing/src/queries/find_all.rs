//! Tree walk shared by every query family

use ahash::AHashSet;
use host::{HostNode, HostTree, NodeId, TreeError};

use crate::accessibility::{is_hidden_from_accessibility, HiddenCache};

#[derive(Debug, Clone, Copy, Default)]
pub struct FindAllOptions {
    /// Keep accessibility-hidden matches
    pub include_hidden_elements: bool,
    /// Drop a match when one of its descendants matched too
    pub match_deepest_only: bool,
}

/// Every element under `root` (inclusive) matching `predicate`, in
/// pre-order document order. Raw text nodes are never candidates.
pub fn find_all<F>(
    tree: &HostTree,
    root: NodeId,
    predicate: F,
    options: FindAllOptions,
) -> Result<Vec<NodeId>, TreeError>
where
    F: Fn(&HostNode) -> bool,
{
    let mut results = Vec::new();
    tree.traverse_df(root, |node| {
        if node.is_element() && predicate(node) {
            results.push(node.node_id);
        }
        Ok(())
    })?;

    if options.match_deepest_only && results.len() > 1 {
        let matched: AHashSet<NodeId> = results.iter().copied().collect();
        let mut has_matching_descendant = AHashSet::new();
        for &id in &results {
            for ancestor in tree.self_and_ancestors(id).skip(1) {
                if matched.contains(&ancestor.node_id) {
                    has_matching_descendant.insert(ancestor.node_id);
                }
            }
        }
        results.retain(|id| !has_matching_descendant.contains(id));
    }

    if options.include_hidden_elements {
        return Ok(results);
    }

    let mut cache = HiddenCache::default();
    results.retain(|&id| !is_hidden_from_accessibility(tree, id, Some(&mut cache)));
    Ok(results)
}
