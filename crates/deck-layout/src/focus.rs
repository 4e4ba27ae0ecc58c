// ABOUTME: Zoom state for the treemap.
// ABOUTME: Tracks the focused subtree and derives the breadcrumb trail back to the root.

use crate::tree::{NodeId, TreeError, TreemapTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub node: NodeId,
    pub label: String,
}

/// Which subtree is drilled into. The renderer lays out the focused node
/// at full size, so zooming is just a change of layout root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusState {
    focus: NodeId,
}

impl FocusState {
    pub fn new(tree: &TreemapTree) -> Self {
        Self { focus: tree.root() }
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    /// Drill into `node`. Only branches can be focused; a leaf leaves the
    /// state unchanged and returns false.
    pub fn zoom_into(&mut self, tree: &TreemapTree, node: NodeId) -> Result<bool, TreeError> {
        if !tree.contains(node) {
            return Err(TreeError::UnknownNode(node.0));
        }
        if tree.is_leaf(node) || node == self.focus {
            return Ok(false);
        }
        tracing::debug!("Zoom into '{}'", tree.path_string(node));
        self.focus = node;
        Ok(true)
    }

    /// Focus the parent of the current node; false at the root
    pub fn zoom_out(&mut self, tree: &TreemapTree) -> bool {
        match tree.parent(self.focus) {
            Some(parent) => {
                tracing::debug!("Zoom out to '{}'", tree.path_string(parent));
                self.focus = parent;
                true
            }
            None => false,
        }
    }

    /// Focus breadcrumb `index` (0 = root). Returns false when out of range
    /// or already focused there.
    pub fn jump_to(&mut self, tree: &TreemapTree, index: usize) -> bool {
        let path = tree.path(self.focus);
        match path.get(index) {
            Some(&node) if node != self.focus => {
                self.focus = node;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self, tree: &TreemapTree) -> bool {
        let changed = self.focus != tree.root();
        self.focus = tree.root();
        changed
    }

    /// Root-to-focus trail; the last entry is the focused node
    pub fn breadcrumbs(&self, tree: &TreemapTree) -> Vec<Breadcrumb> {
        tree.path(self.focus)
            .into_iter()
            .map(|node| Breadcrumb {
                node,
                label: tree.name(node).to_string(),
            })
            .collect()
    }
}
