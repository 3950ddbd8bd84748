//! Arena-based host tree storage
//!
//! ```text
//! Arena: Vec<Option<HostNode>>
//!        [Node0][Node1][None][Node3]...
//!         ↑ u32 index, parent links are indices too
//! ```
//!
//! Removed subtrees leave tombstones behind so an id never points at a
//! different node later on. A stale id simply resolves to `NodeNotFound`.

use crate::error::{Result, TreeError};
use crate::types::{EventHandler, HostNode, NodeId};

/// Arena owning every node of one rendered tree
#[derive(Debug, Default, Clone)]
pub struct HostTree {
    nodes: Vec<Option<HostNode>>,
    root_id: Option<NodeId>,
    live: usize,
}

impl HostTree {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
            live: 0,
        }
    }

    /// Add a detached node, returns its ID.
    ///
    /// Links are reset: use [`HostTree::attach`] or
    /// [`HostTree::append_child`] to place it.
    pub fn add_node(&mut self, mut node: HostNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        node.parent_id = None;
        node.children_ids.clear();
        self.nodes.push(Some(node));
        self.live += 1;
        node_id
    }

    /// Add `node` as the last child of `parent_id`
    pub fn append_child(&mut self, parent_id: NodeId, node: HostNode) -> Result<NodeId> {
        self.get(parent_id)?;
        let child_id = self.add_node(node);
        self.attach(parent_id, child_id)?;
        Ok(child_id)
    }

    /// Link a detached node under `parent_id`
    pub fn attach(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        if self.get(child_id)?.parent_id.is_some() || self.root_id == Some(child_id) {
            return Err(TreeError::AlreadyAttached(child_id));
        }
        self.get_mut(parent_id)?.children_ids.push(child_id);
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        Ok(())
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, node_id: NodeId) -> Result<()> {
        let parent_id = self.get(node_id)?.parent_id;
        if let Some(parent_id) = parent_id {
            let parent = self.get_mut(parent_id)?;
            parent.children_ids.retain(|id| *id != node_id);
        }
        if self.root_id == Some(node_id) {
            self.root_id = None;
        }

        let mut stack = vec![node_id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id as usize).and_then(Option::take) {
                self.live -= 1;
                stack.extend(node.children_ids.iter().copied());
            }
        }

        tracing::trace!(node_id, "removed subtree");
        Ok(())
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&HostNode> {
        self.nodes
            .get(node_id as usize)
            .and_then(Option::as_ref)
            .ok_or(TreeError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut HostNode> {
        self.nodes
            .get_mut(node_id as usize)
            .and_then(Option::as_mut)
            .ok_or(TreeError::NodeNotFound(node_id))
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.get(node_id).is_ok()
    }

    /// Register or replace a handler prop on a node
    pub fn set_handler(
        &mut self,
        node_id: NodeId,
        name: impl Into<String>,
        handler: EventHandler,
    ) -> Result<()> {
        self.get_mut(node_id)?.handlers.insert(name.into(), handler);
        Ok(())
    }

    /// Replace the content of a `RawText` node
    pub fn set_text(&mut self, node_id: NodeId, value: impl Into<String>) -> Result<()> {
        let node = self.get_mut(node_id)?;
        if !node.is_raw_text() {
            return Err(TreeError::InvalidNodeKind(node.kind.to_string()));
        }
        node.node_value = value.into();
        Ok(())
    }

    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        if self.get(node_id)?.parent_id.is_some() {
            return Err(TreeError::AlreadyAttached(node_id));
        }
        self.root_id = Some(node_id);
        Ok(())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    pub fn root(&self) -> Result<&HostNode> {
        let root_id = self.root_id.ok_or(TreeError::NoRoot)?;
        self.get(root_id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterator over live nodes in allocation order
    pub fn iter(&self) -> impl Iterator<Item = &HostNode> {
        self.nodes.iter().flatten()
    }

    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(node_id)?.children_ids)
    }

    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Walk from `node_id` up to its topmost ancestor, node itself first
    pub fn self_and_ancestors(&self, node_id: NodeId) -> impl Iterator<Item = &HostNode> + '_ {
        let mut next = self.get(node_id).ok();
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent_id.and_then(|id| self.get(id).ok());
            Some(current)
        })
    }

    /// Topmost ancestor of a node (the node itself when detached)
    pub fn container(&self, node_id: NodeId) -> Result<NodeId> {
        self.get(node_id)?;
        Ok(self
            .self_and_ancestors(node_id)
            .last()
            .map(|node| node.node_id)
            .unwrap_or(node_id))
    }

    /// Whether the node is still reachable from the root
    pub fn is_attached(&self, node_id: NodeId) -> bool {
        match (self.root_id, self.container(node_id)) {
            (Some(root_id), Ok(container)) => root_id == container,
            _ => false,
        }
    }

    /// Traverse a subtree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&HostNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// First node in document order under `start_id` matching the predicate
    pub fn find_one<F>(&self, start_id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&HostNode) -> bool,
    {
        let mut found = None;
        let _ = self.traverse_df(start_id, |node| {
            if found.is_none() && predicate(node) {
                found = Some(node.node_id);
            }
            Ok(())
        });
        found
    }

    /// Raw lookup by `testID`, ignoring accessibility
    pub fn find_by_test_id(&self, test_id: &str) -> Option<NodeId> {
        let root_id = self.root_id?;
        self.find_one(root_id, |node| node.props.test_id.as_deref() == Some(test_id))
    }

    /// Raw lookup by `nativeID` within the tree containing `node_id`
    pub fn find_by_native_id(&self, node_id: NodeId, native_id: &str) -> Option<NodeId> {
        let container = self.container(node_id).ok()?;
        self.find_one(container, |node| {
            node.props.native_id.as_deref() == Some(native_id)
        })
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_id = None;
        self.live = 0;
    }
}
