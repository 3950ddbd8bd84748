//! Utility functions for host tree processing

use crate::arena::HostTree;
use crate::error::Result;
use crate::types::{NodeId, NodeKind};

/// Concatenated content of every `RawText` under the node, document order.
///
/// Not trimmed: normalization belongs to the matcher.
pub fn get_text_content(tree: &HostTree, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    tree.traverse_df(node_id, |node| {
        if node.kind == NodeKind::RawText {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text)
}

/// Host siblings: the other element children of the node's parent
pub fn get_host_siblings(tree: &HostTree, node_id: NodeId) -> Result<Vec<NodeId>> {
    let Some(parent_id) = tree.parent(node_id)? else {
        return Ok(Vec::new());
    };

    Ok(tree
        .children(parent_id)?
        .iter()
        .copied()
        .filter(|&id| id != node_id)
        .filter(|&id| tree.get(id).map(|node| node.is_element()).unwrap_or(false))
        .collect())
}

/// Cap text length for error messages
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
