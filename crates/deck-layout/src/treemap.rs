// ABOUTME: Slice-and-dice treemap layout.
// ABOUTME: Splits each node's rect among its children by value, alternating axis per level.

use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::{Direction, Point, Rect};
use crate::tree::{NodeId, TreemapTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Axis used to split the root's children
    pub start_direction: Direction,
    /// Deepest level (relative to the layout root) to emit; None = all
    pub max_depth: Option<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            start_direction: Direction::Horizontal,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutRect {
    pub node: NodeId,
    pub rect: Rect,
    /// Levels below the layout root
    pub depth: usize,
    /// Axis this node's children were split along
    pub direction: Direction,
    /// No children were laid out inside this rect
    pub leaf: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    /// Pre-order: every rect comes before the rects nested in it
    pub rects: Vec<LayoutRect>,
    #[serde(skip)]
    pub index: HashMap<NodeId, usize>,
}

impl Layout {
    pub fn get(&self, node: NodeId) -> Option<&LayoutRect> {
        self.index.get(&node).map(|&i| &self.rects[i])
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Deepest non-empty rect containing `point`
    pub fn hit_test(&self, point: Point) -> Option<&LayoutRect> {
        // Pre-order means the last match is the deepest one
        self.rects
            .iter()
            .rev()
            .find(|r| r.rect.area() > 0.0 && r.rect.contains(point))
    }

    /// Rects with nothing drawn inside them
    pub fn leaves(&self) -> impl Iterator<Item = &LayoutRect> {
        self.rects.iter().filter(|r| r.leaf)
    }
}

/// Lay out `root` and its descendants inside `bounds`.
///
/// Every emitted node gets a rect whose area is proportional to its value
/// relative to its parent. Children tile their parent exactly: the last
/// child with a positive value absorbs floating point remainder.
pub fn compute_layout(
    tree: &TreemapTree,
    root: NodeId,
    bounds: Rect,
    options: &LayoutOptions,
) -> Layout {
    let mut layout = Layout {
        rects: Vec::with_capacity(tree.len()),
        index: HashMap::with_capacity(tree.len()),
    };
    slice(
        tree,
        root,
        bounds,
        0,
        options.start_direction,
        options,
        &mut layout,
    );
    tracing::debug!(
        "Laid out '{}' into {} rects ({:.0}x{:.0})",
        tree.name(root),
        layout.rects.len(),
        bounds.width,
        bounds.height
    );
    layout
}

fn slice(
    tree: &TreemapTree,
    node: NodeId,
    rect: Rect,
    depth: usize,
    direction: Direction,
    options: &LayoutOptions,
    out: &mut Layout,
) {
    let children = tree.children(node);
    let at_limit = options.max_depth.is_some_and(|max| depth >= max);
    let leaf = children.is_empty() || at_limit;

    out.index.insert(node, out.rects.len());
    out.rects.push(LayoutRect {
        node,
        rect,
        depth,
        direction,
        leaf,
    });

    if leaf {
        return;
    }

    let total = tree.value(node);
    let extent = rect.length(direction);
    let last_weighted = children.iter().rposition(|c| tree.value(*c) > 0.0);

    let mut remaining = rect;
    for (i, &child) in children.iter().enumerate() {
        let length = match last_weighted {
            Some(last) if i == last => remaining.length(direction),
            Some(last) if i < last => {
                let ratio = tree.value(child) / total;
                if ratio.is_finite() {
                    ratio as f32 * extent
                } else {
                    0.0
                }
            }
            // Zero-valued parents and trailing zero children collapse in place
            _ => 0.0,
        };
        let (child_rect, rest) = remaining.take(direction, length);
        remaining = rest;
        slice(
            tree,
            child,
            child_rect,
            depth + 1,
            direction.flip(),
            options,
            out,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::WeightedNode;

    fn sample() -> TreemapTree {
        TreemapTree::from_weighted(&WeightedNode::branch(
            "root",
            vec![
                WeightedNode::branch(
                    "a",
                    vec![
                        WeightedNode::leaf("a1", 30.0),
                        WeightedNode::leaf("a2", 10.0),
                        WeightedNode::leaf("a3", 20.0),
                    ],
                ),
                WeightedNode::leaf("b", 25.0),
                WeightedNode::branch(
                    "c",
                    vec![WeightedNode::leaf("c1", 7.5), WeightedNode::leaf("c2", 7.5)],
                ),
            ],
        ))
        .unwrap()
    }

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 300.0)
    }

    #[test]
    fn every_node_gets_a_rect() {
        let tree = sample();
        let layout = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        assert_eq!(layout.len(), tree.len());
        assert_eq!(layout.rects[0].rect, bounds());
    }

    #[test]
    fn children_areas_sum_to_parent() {
        let tree = sample();
        let layout = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        for r in &layout.rects {
            let children = tree.children(r.node);
            if children.is_empty() {
                continue;
            }
            let sum: f32 = children
                .iter()
                .map(|c| layout.get(*c).unwrap().rect.area())
                .sum();
            assert!(
                (sum - r.rect.area()).abs() <= r.rect.area() * 1e-3,
                "children of {} cover {} of {}",
                tree.name(r.node),
                sum,
                r.rect.area()
            );
        }
    }

    #[test]
    fn area_is_proportional_to_value() {
        let tree = sample();
        let layout = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        let total_area = bounds().area() as f64;
        for r in &layout.rects {
            let expected = tree.value(r.node) / tree.value(tree.root()) * total_area;
            assert!((r.rect.area() as f64 - expected).abs() < 1.0);
        }
    }

    #[test]
    fn direction_alternates_by_depth() {
        let tree = sample();
        let layout = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());

        // Depth 1 splits the width: all three share the full height
        let a = layout.get(tree.find_path("a").unwrap()).unwrap();
        let b = layout.get(tree.find_path("b").unwrap()).unwrap();
        assert_eq!(a.rect.height, 300.0);
        assert!((a.rect.width - 240.0).abs() < 0.01);
        assert!((b.rect.x - 240.0).abs() < 0.01);
        assert_eq!(a.direction, Direction::Vertical);

        // Depth 2 splits the height inside "a"
        let a1 = layout.get(tree.find_path("a/a1").unwrap()).unwrap();
        let a2 = layout.get(tree.find_path("a/a2").unwrap()).unwrap();
        assert_eq!(a1.rect.width, a.rect.width);
        assert!((a1.rect.height - 150.0).abs() < 0.01);
        assert!((a2.rect.y - 150.0).abs() < 0.01);
    }

    #[test]
    fn vertical_start_direction() {
        let tree = sample();
        let options = LayoutOptions {
            start_direction: Direction::Vertical,
            max_depth: None,
        };
        let layout = compute_layout(&tree, tree.root(), bounds(), &options);
        let a = layout.get(tree.find_path("a").unwrap()).unwrap();
        assert_eq!(a.rect.width, 400.0);
        assert!((a.rect.height - 180.0).abs() < 0.01);
    }

    #[test]
    fn max_depth_stops_descent() {
        let tree = sample();
        let options = LayoutOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let layout = compute_layout(&tree, tree.root(), bounds(), &options);
        assert_eq!(layout.len(), 4);
        assert!(layout.get(tree.find_path("a/a1").unwrap()).is_none());
        assert_eq!(layout.leaves().count(), 3);
    }

    #[test]
    fn zoomed_layout_fills_bounds_with_subtree() {
        let tree = sample();
        let a = tree.find_path("a").unwrap();
        let layout = compute_layout(&tree, a, bounds(), &LayoutOptions::default());
        assert_eq!(layout.len(), 4);
        assert_eq!(layout.rects[0].rect, bounds());
        let a1 = layout.get(tree.find_path("a/a1").unwrap()).unwrap();
        assert_eq!(a1.depth, 1);
        assert!((a1.rect.width - 200.0).abs() < 0.01);
    }

    #[test]
    fn zero_valued_parent_collapses_children() {
        let tree = TreemapTree::from_weighted(&WeightedNode::branch(
            "root",
            vec![
                WeightedNode::branch(
                    "empty",
                    vec![WeightedNode::leaf("x", 0.0), WeightedNode::leaf("y", 0.0)],
                ),
                WeightedNode::leaf("full", 1.0),
            ],
        ))
        .unwrap();
        let layout = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        let empty = layout.get(tree.find_path("empty").unwrap()).unwrap();
        let x = layout.get(tree.find_path("empty/x").unwrap()).unwrap();
        let full = layout.get(tree.find_path("full").unwrap()).unwrap();
        assert_eq!(empty.rect.area(), 0.0);
        assert_eq!(x.rect.area(), 0.0);
        assert_eq!(full.rect, bounds());
    }

    #[test]
    fn trailing_zero_child_does_not_steal_space() {
        let tree = TreemapTree::from_weighted(&WeightedNode::branch(
            "root",
            vec![WeightedNode::leaf("a", 1.0), WeightedNode::leaf("z", 0.0)],
        ))
        .unwrap();
        let layout = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        let a = layout.get(tree.find_path("a").unwrap()).unwrap();
        let z = layout.get(tree.find_path("z").unwrap()).unwrap();
        assert_eq!(a.rect, bounds());
        assert_eq!(z.rect.area(), 0.0);
    }

    #[test]
    fn hit_test_returns_deepest() {
        let tree = sample();
        let layout = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        let hit = layout.hit_test(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(tree.path_string(hit.node), "a/a1");
        let hit = layout.hit_test(Point::new(250.0, 10.0)).unwrap();
        assert_eq!(tree.path_string(hit.node), "b");
        assert!(layout.hit_test(Point::new(-1.0, 10.0)).is_none());
    }

    #[test]
    fn layout_is_deterministic() {
        let tree = sample();
        let first = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        let second = compute_layout(&tree, tree.root(), bounds(), &LayoutOptions::default());
        assert_eq!(first.rects, second.rects);
    }
}
