// ABOUTME: Weighted hierarchy backing the treemap.
// ABOUTME: Arena of named nodes whose value is the sum of their leaves.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// Nested input form, as read from JSON.
/// `value` is only meaningful on leaves; a branch is worth its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WeightedNode>,
}

impl WeightedNode {
    pub fn leaf(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn branch(name: &str, children: Vec<WeightedNode>) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    #[error("Node '{name}' has negative value {value}")]
    NegativeValue { name: String, value: f64 },

    #[error("Node '{name}' has a non-finite value")]
    NonFiniteValue { name: String },

    #[error("Node under '{parent}' has an empty name")]
    EmptyName { parent: String },

    #[error("Node name '{name}' may not contain '/'")]
    InvalidName { name: String },

    #[error("'{parent}' has more than one child named '{name}'")]
    DuplicateName { parent: String, name: String },

    #[error("Unknown node id {0}")]
    UnknownNode(usize),

    #[error("No node at path '{0}'")]
    UnknownPath(String),
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    value: f64,
    depth: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct TreemapTree {
    nodes: Vec<Node>,
}

impl TreemapTree {
    pub fn from_weighted(root: &WeightedNode) -> Result<Self, TreeError> {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(root, None, 0)?;
        tracing::debug!(
            "Built treemap tree '{}' with {} nodes, total {}",
            root.name,
            tree.nodes.len(),
            tree.nodes[0].value
        );
        Ok(tree)
    }

    fn insert(
        &mut self,
        src: &WeightedNode,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId, TreeError> {
        let parent_name = parent
            .map(|p| self.nodes[p.0].name.clone())
            .unwrap_or_default();
        if src.name.trim().is_empty() {
            return Err(TreeError::EmptyName {
                parent: parent_name,
            });
        }
        if src.name.contains('/') {
            return Err(TreeError::InvalidName {
                name: src.name.clone(),
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: src.name.clone(),
            value: 0.0,
            depth,
            parent,
            children: Vec::with_capacity(src.children.len()),
        });

        if src.children.is_empty() {
            let value = src.value.unwrap_or(0.0);
            if !value.is_finite() {
                return Err(TreeError::NonFiniteValue {
                    name: src.name.clone(),
                });
            }
            if value < 0.0 {
                return Err(TreeError::NegativeValue {
                    name: src.name.clone(),
                    value,
                });
            }
            self.nodes[id.0].value = value;
            return Ok(id);
        }

        if let Some(value) = src.value {
            tracing::debug!(
                "Ignoring value {} on branch '{}'; branches sum their children",
                value,
                src.name
            );
        }

        let mut seen = HashSet::new();
        let mut total = 0.0;
        for child in &src.children {
            if !seen.insert(child.name.as_str()) {
                return Err(TreeError::DuplicateName {
                    parent: src.name.clone(),
                    name: child.name.clone(),
                });
            }
            let child_id = self.insert(child, Some(id), depth + 1)?;
            total += self.nodes[child_id.0].value;
            self.nodes[id.0].children.push(child_id);
        }
        // Finite leaves can still overflow once summed
        if !total.is_finite() {
            return Err(TreeError::NonFiniteValue {
                name: src.name.clone(),
            });
        }
        self.nodes[id.0].value = total;
        Ok(id)
    }

    /// A lone root with no value
    pub fn empty(name: &str) -> Self {
        Self {
            nodes: vec![Node {
                name: name.to_string(),
                value: 0.0,
                depth: 0,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    /// Leaf value, or the sum of all leaves below a branch
    pub fn value(&self, id: NodeId) -> f64 {
        self.nodes[id.0].value
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Distance from the root (root = 0)
    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id.0].depth
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].children.is_empty()
    }

    /// Node ids from the root down to `id`, inclusive
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// `/`-joined names below the root; empty for the root itself
    pub fn path_string(&self, id: NodeId) -> String {
        self.path(id)
            .iter()
            .skip(1)
            .map(|n| self.name(*n))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Resolve a string produced by [`path_string`](Self::path_string)
    pub fn find_path(&self, path: &str) -> Result<NodeId, TreeError> {
        let mut current = self.root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self
                .children(current)
                .iter()
                .copied()
                .find(|c| self.name(*c) == segment)
                .ok_or_else(|| TreeError::UnknownPath(path.to_string()))?;
        }
        Ok(current)
    }

    /// The root's child on the path to `id`; None for the root
    pub fn top_level_ancestor(&self, id: NodeId) -> Option<NodeId> {
        self.path(id).get(1).copied()
    }

    /// True if `ancestor` lies on the path from the root to `id` (inclusive)
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Position of `id` among its siblings
    pub fn sibling_index(&self, id: NodeId) -> usize {
        self.parent(id)
            .and_then(|p| self.children(p).iter().position(|c| *c == id))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> WeightedNode {
        WeightedNode::branch(
            "Company",
            vec![
                WeightedNode::branch(
                    "Engineering",
                    vec![
                        WeightedNode::leaf("Backend", 40.0),
                        WeightedNode::leaf("Frontend", 20.0),
                    ],
                ),
                WeightedNode::leaf("Sales", 30.0),
                WeightedNode::leaf("Legal", 10.0),
            ],
        )
    }

    #[test]
    fn branch_value_is_sum_of_leaves() {
        let tree = TreemapTree::from_weighted(&org()).unwrap();
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.value(tree.root()), 100.0);
        let eng = tree.find_path("Engineering").unwrap();
        assert_eq!(tree.value(eng), 60.0);
        assert!(!tree.is_leaf(eng));
    }

    #[test]
    fn branch_value_overrides_explicit_value() {
        let mut input = org();
        input.value = Some(5.0);
        let tree = TreemapTree::from_weighted(&input).unwrap();
        assert_eq!(tree.value(tree.root()), 100.0);
    }

    #[test]
    fn path_strings_round_trip() {
        let tree = TreemapTree::from_weighted(&org()).unwrap();
        let backend = tree.find_path("Engineering/Backend").unwrap();
        assert_eq!(tree.path_string(backend), "Engineering/Backend");
        assert_eq!(tree.depth(backend), 2);
        assert_eq!(tree.path(backend).len(), 3);
        assert_eq!(tree.path_string(tree.root()), "");
        assert_eq!(tree.find_path("").unwrap(), tree.root());
    }

    #[test]
    fn unknown_path_is_error() {
        let tree = TreemapTree::from_weighted(&org()).unwrap();
        assert_eq!(
            tree.find_path("Engineering/Ops"),
            Err(TreeError::UnknownPath("Engineering/Ops".to_string()))
        );
    }

    #[test]
    fn top_level_ancestor_and_ancestry() {
        let tree = TreemapTree::from_weighted(&org()).unwrap();
        let eng = tree.find_path("Engineering").unwrap();
        let frontend = tree.find_path("Engineering/Frontend").unwrap();
        assert_eq!(tree.top_level_ancestor(frontend), Some(eng));
        assert_eq!(tree.top_level_ancestor(tree.root()), None);
        assert!(tree.is_ancestor(eng, frontend));
        assert!(!tree.is_ancestor(frontend, eng));
        assert_eq!(tree.sibling_index(frontend), 1);
    }

    #[test]
    fn rejects_negative_and_nan() {
        let negative = WeightedNode::branch("root", vec![WeightedNode::leaf("a", -1.0)]);
        assert!(matches!(
            TreemapTree::from_weighted(&negative),
            Err(TreeError::NegativeValue { .. })
        ));

        let nan = WeightedNode::branch("root", vec![WeightedNode::leaf("a", f64::NAN)]);
        assert!(matches!(
            TreemapTree::from_weighted(&nan),
            Err(TreeError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn rejects_branch_totals_that_overflow() {
        let big = 0.75 * f64::MAX;
        let input = WeightedNode::branch(
            "root",
            vec![
                WeightedNode::branch(
                    "a",
                    vec![WeightedNode::leaf("x", big), WeightedNode::leaf("y", big)],
                ),
                WeightedNode::branch(
                    "b",
                    vec![WeightedNode::leaf("z", big), WeightedNode::leaf("w", big)],
                ),
            ],
        );
        assert_eq!(
            TreemapTree::from_weighted(&input).err(),
            Some(TreeError::NonFiniteValue { name: "a".into() })
        );
    }

    #[test]
    fn rejects_bad_names() {
        let dup = WeightedNode::branch(
            "root",
            vec![WeightedNode::leaf("a", 1.0), WeightedNode::leaf("a", 2.0)],
        );
        assert!(matches!(
            TreemapTree::from_weighted(&dup),
            Err(TreeError::DuplicateName { .. })
        ));

        let slash = WeightedNode::branch("root", vec![WeightedNode::leaf("a/b", 1.0)]);
        assert!(matches!(
            TreemapTree::from_weighted(&slash),
            Err(TreeError::InvalidName { .. })
        ));

        let empty = WeightedNode::branch("root", vec![WeightedNode::leaf(" ", 1.0)]);
        assert_eq!(
            TreemapTree::from_weighted(&empty).unwrap_err(),
            TreeError::EmptyName {
                parent: "root".to_string()
            }
        );
    }

    #[test]
    fn parses_json_input() {
        let json = r#"{
            "name": "root",
            "children": [
                { "name": "a", "value": 3 },
                { "name": "b", "children": [ { "name": "c", "value": 2 } ] },
                { "name": "d" }
            ]
        }"#;
        let input: WeightedNode = serde_json::from_str(json).unwrap();
        let tree = TreemapTree::from_weighted(&input).unwrap();
        assert_eq!(tree.value(tree.root()), 5.0);
        assert_eq!(tree.value(tree.find_path("d").unwrap()), 0.0);
    }
}
