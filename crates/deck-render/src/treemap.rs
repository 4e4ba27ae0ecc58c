// ABOUTME: Zoomable treemap chart.
// ABOUTME: Click a branch to drill in, use the breadcrumb bar to climb back out.

use deck_core::format;
use deck_layout::{
    compute_layout, FocusState, LayoutOptions, LayoutRect, NodeId, Point, Rect, TreemapTree,
    WeightedNode,
};

use crate::chart::{Chart, ChartKind, Interaction, InteractionError, RenderContext, MARGIN};
use crate::svg::{self, Document, Element};

const CRUMB_BAR_HEIGHT: f32 = 26.0;
const CRUMB_SEPARATOR: &str = " › ";
/// Lightening applied per level below the focused node
const DEPTH_TINT: f32 = 0.22;

pub struct TreemapChart {
    title: String,
    /// Prepended to formatted values, e.g. "$"
    value_prefix: String,
    tree: TreemapTree,
    focus: FocusState,
    hovered: Option<NodeId>,
    selected: Option<NodeId>,
}

impl TreemapChart {
    pub fn new(title: &str, tree: TreemapTree) -> Self {
        let focus = FocusState::new(&tree);
        Self {
            title: title.to_string(),
            value_prefix: String::new(),
            tree,
            focus,
            hovered: None,
            selected: None,
        }
    }

    pub fn with_value_prefix(mut self, prefix: &str) -> Self {
        self.value_prefix = prefix.to_string();
        self
    }

    /// Monthly cloud spend per team
    pub fn sample() -> Self {
        let leaf = WeightedNode::leaf;
        let branch = WeightedNode::branch;
        let data = branch(
            "All Teams",
            vec![
                branch(
                    "Engineering",
                    vec![
                        branch(
                            "Platform",
                            vec![
                                leaf("Compute", 420_000.0),
                                leaf("Storage", 180_000.0),
                                leaf("Network", 95_000.0),
                            ],
                        ),
                        branch(
                            "Data",
                            vec![leaf("Warehouse", 260_000.0), leaf("Streaming", 140_000.0)],
                        ),
                        branch(
                            "Product",
                            vec![leaf("Web", 120_000.0), leaf("Mobile", 85_000.0)],
                        ),
                    ],
                ),
                branch(
                    "Operations",
                    vec![
                        leaf("Security", 110_000.0),
                        leaf("IT", 65_000.0),
                        leaf("Finance Systems", 35_000.0),
                    ],
                ),
                branch(
                    "Marketing",
                    vec![
                        leaf("Campaigns", 90_000.0),
                        leaf("Analytics", 45_000.0),
                        leaf("Hosting", 30_000.0),
                    ],
                ),
                branch("Sales", vec![leaf("CRM", 75_000.0), leaf("Demos", 40_000.0)]),
            ],
        );

        let tree = TreemapTree::from_weighted(&data).unwrap_or_else(|e| {
            tracing::error!("Sample treemap rejected: {}", e);
            TreemapTree::empty("All Teams")
        });
        Self::new("Cloud Spend by Team", tree).with_value_prefix("$")
    }

    pub fn tree(&self) -> &TreemapTree {
        &self.tree
    }

    pub fn focus(&self) -> NodeId {
        self.focus.focus()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// `data-key` of a node: its path, or `/` for the root
    pub fn node_key(&self, node: NodeId) -> String {
        if node == self.tree.root() {
            "/".to_string()
        } else {
            self.tree.path_string(node)
        }
    }

    fn resolve(&self, key: &str) -> Result<NodeId, InteractionError> {
        self.tree
            .find_path(key)
            .map_err(|_| InteractionError::UnknownTarget {
                chart: ChartKind::Treemap.name(),
                key: key.to_string(),
            })
    }

    /// Resolves a click target: a node in the focused subtree or one of its breadcrumbs
    fn resolve_clickable(&self, key: &str) -> Result<NodeId, InteractionError> {
        let node = self.resolve(key)?;
        let focus = self.focus.focus();
        if self.tree.is_ancestor(focus, node) || self.tree.is_ancestor(node, focus) {
            Ok(node)
        } else {
            Err(InteractionError::UnknownTarget {
                chart: ChartKind::Treemap.name(),
                key: key.to_string(),
            })
        }
    }

    fn clear_transient(&mut self) {
        self.hovered = None;
        self.selected = None;
    }

    fn value_label(&self, node: NodeId) -> String {
        format!("{}{}", self.value_prefix, format::compact(self.tree.value(node)))
    }

    /// Share of the focused node's value
    fn share(&self, node: NodeId) -> f64 {
        let total = self.tree.value(self.focus.focus());
        if total > 0.0 {
            self.tree.value(node) / total
        } else {
            0.0
        }
    }

    /// Which child of the focused node `node` lives under, for coloring
    fn branch_index(&self, node: NodeId) -> usize {
        let path = self.tree.path(node);
        path.iter()
            .position(|n| *n == self.focus.focus())
            .and_then(|i| path.get(i + 1))
            .map(|n| self.tree.sibling_index(*n))
            .unwrap_or(0)
    }

    fn layout_options(&self, ctx: &RenderContext) -> LayoutOptions {
        LayoutOptions {
            max_depth: match ctx.treemap.max_depth {
                0 => None,
                n => Some(n),
            },
            ..LayoutOptions::default()
        }
    }

    fn render_breadcrumbs(&self, ctx: &RenderContext, area: Rect) -> Element {
        let crumbs = self.focus.breadcrumbs(&self.tree);
        let baseline = area.y + CRUMB_BAR_HEIGHT * 0.65;
        let mut x = area.x;
        let mut bar = svg::group().class("breadcrumbs");

        for (i, crumb) in crumbs.iter().enumerate() {
            let current = i + 1 == crumbs.len();
            let mut item = ctx
                .label(Point::new(x, baseline), &crumb.label, ctx.palette.accent)
                .key(&self.node_key(crumb.node))
                .class("crumb");
            if current {
                item = item
                    .fill(ctx.palette.foreground)
                    .attr("font-weight", "600");
            }
            bar.push(item);
            x += format::text_width(&crumb.label, ctx.font_size);

            if !current {
                bar.push(ctx.label(Point::new(x, baseline), CRUMB_SEPARATOR, ctx.palette.muted));
                x += format::text_width(CRUMB_SEPARATOR, ctx.font_size);
            }
        }
        bar
    }

    fn render_cell(&self, ctx: &RenderContext, cell: &LayoutRect) -> Option<Element> {
        let rect = cell.rect.inset(ctx.treemap.padding);
        if rect.area() <= 0.0 {
            return None;
        }
        let node = cell.node;
        let key = self.node_key(node);
        let base = ctx.palette.series_color(self.branch_index(node));
        let fill = base.lighten(DEPTH_TINT * cell.depth.saturating_sub(1) as f32);

        let mut shape = svg::rect(rect).fill(fill).class("cell");
        shape = match (self.selected == Some(node), self.hovered == Some(node)) {
            (true, _) => shape.stroke(ctx.palette.foreground, 3.0),
            (false, true) => shape.stroke(ctx.palette.accent, 2.0),
            _ => shape.stroke(ctx.palette.background, 1.0),
        };

        let tooltip = format!(
            "{}: {} ({})",
            self.tree.path_string(node),
            self.value_label(node),
            format::percent(self.share(node), 1)
        );
        let mut group = svg::group()
            .key(&key)
            .class(if cell.leaf { "leaf" } else { "branch" })
            .child(shape.child(svg::title(&tooltip)));

        let fits = rect.width >= ctx.treemap.min_label_width && rect.height >= ctx.font_size * 1.6;
        if !fits {
            return Some(group);
        }

        let inner = rect.width - 8.0;
        let name = self.tree.name(node);
        if let Some(label) = format::fit_label(name, inner, ctx.font_size) {
            let mut text = ctx
                .label(
                    Point::new(rect.x + 4.0, rect.y + ctx.font_size + 2.0),
                    &label,
                    ctx.palette.background,
                )
                .attr("pointer-events", "none");
            if !cell.leaf {
                text = text.attr("font-weight", "600");
            }
            group.push(text);
        }

        let value = self.value_label(node);
        if cell.leaf && rect.height >= ctx.font_size * 3.0 {
            if let Some(label) = format::fit_label(&value, inner, ctx.font_size) {
                group.push(
                    ctx.label(
                        Point::new(rect.x + 4.0, rect.y + ctx.font_size * 2.3 + 2.0),
                        &label,
                        ctx.palette.background,
                    )
                    .opacity(0.85)
                    .attr("pointer-events", "none"),
                );
            }
        }
        Some(group)
    }
}

impl Chart for TreemapChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Treemap
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn handle(&mut self, interaction: &Interaction) -> Result<bool, InteractionError> {
        match interaction {
            Interaction::Hover(None) => Ok(self.hovered.take().is_some()),
            Interaction::Hover(Some(key)) => {
                let next = self.tree.find_path(key).ok();
                let changed = self.hovered != next;
                self.hovered = next;
                Ok(changed)
            }
            Interaction::Click(key) => {
                let node = self.resolve_clickable(key)?;
                if self.tree.is_leaf(node) {
                    self.selected = if self.selected == Some(node) {
                        None
                    } else {
                        Some(node)
                    };
                    return Ok(true);
                }
                let zoomed = self
                    .focus
                    .zoom_into(&self.tree, node)
                    .map_err(|_| InteractionError::UnknownTarget {
                        chart: ChartKind::Treemap.name(),
                        key: key.clone(),
                    })?;
                if zoomed {
                    self.clear_transient();
                }
                Ok(zoomed)
            }
            Interaction::Back => {
                let changed = self.focus.zoom_out(&self.tree);
                if changed {
                    self.clear_transient();
                }
                Ok(changed)
            }
            Interaction::Breadcrumb(index) => {
                let changed = self.focus.jump_to(&self.tree, *index);
                if changed {
                    self.clear_transient();
                }
                Ok(changed)
            }
            Interaction::Reset => {
                let had_state = self.hovered.is_some() || self.selected.is_some();
                let moved = self.focus.reset(&self.tree);
                self.clear_transient();
                Ok(moved || had_state)
            }
            Interaction::Filter(_) | Interaction::Sort(_) | Interaction::Toggle(_) => {
                Err(InteractionError::unsupported(self.kind(), interaction))
            }
        }
    }

    fn render(&self, ctx: &RenderContext) -> Document {
        let mut doc = ctx.document(&self.title);
        let body = ctx.body();

        if let Some(node) = self.selected {
            doc.push(
                ctx.small_label(
                    Point::new(ctx.width - MARGIN, 24.0),
                    &format!(
                        "{}: {} ({})",
                        self.tree.name(node),
                        self.value_label(node),
                        format::percent(self.share(node), 1)
                    ),
                )
                .attr("text-anchor", "end")
                .class("selection"),
            );
        }

        doc.push(self.render_breadcrumbs(ctx, body));

        let area = Rect::new(
            body.x,
            body.y + CRUMB_BAR_HEIGHT,
            body.width,
            (body.height - CRUMB_BAR_HEIGHT).max(0.0),
        );
        let layout = compute_layout(
            &self.tree,
            self.focus.focus(),
            area,
            &self.layout_options(ctx),
        );

        let mut cells = svg::group().class("cells");
        let mut drawn = 0;
        // Depth 0 is the focused node itself; its children cover it entirely
        for cell in layout.rects.iter().filter(|c| c.depth > 0) {
            if let Some(el) = self.render_cell(ctx, cell) {
                cells.push(el);
                drawn += 1;
            }
        }
        if drawn == 0 {
            cells.push(
                ctx.small_label(area.center(), "No data")
                    .attr("text-anchor", "middle"),
            );
        }
        doc.push(cells);
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> TreemapChart {
        TreemapChart::sample()
    }

    #[test]
    fn sample_renders_two_levels() {
        let chart = chart();
        let doc = chart.render(&RenderContext::default());
        assert!(doc.find_by_key("Engineering").is_some());
        assert!(doc.find_by_key("Engineering/Platform").is_some());
        assert!(doc.find_by_key("Engineering/Platform/Compute").is_none());
        assert!(doc.find_by_key("/").is_some());
    }

    #[test]
    fn click_branch_zooms_and_recomputes_layout() {
        let mut chart = chart();
        assert!(chart
            .handle(&Interaction::Click("Engineering".into()))
            .unwrap());
        assert_eq!(chart.tree().name(chart.focus()), "Engineering");

        let doc = chart.render(&RenderContext::default());
        assert!(doc.find_by_key("Engineering/Platform/Compute").is_some());
        assert!(doc.find_by_key("Sales").is_none());

        let crumbs = doc.root.keys();
        assert!(crumbs.contains(&"/".to_string()));
    }

    #[test]
    fn click_leaf_toggles_selection() {
        let mut chart = chart();
        let key = Interaction::Click("Sales/CRM".into());
        assert!(chart.handle(&key).unwrap());
        assert_eq!(chart.tree().name(chart.selected().unwrap()), "CRM");
        assert_eq!(chart.focus(), chart.tree().root());

        let svg = chart.render(&RenderContext::default()).to_string();
        assert!(svg.contains("CRM: $75.0K"));

        assert!(chart.handle(&key).unwrap());
        assert_eq!(chart.selected(), None);
    }

    #[test]
    fn zoom_clears_selection_and_hover() {
        let mut chart = chart();
        chart.handle(&Interaction::Click("Sales/CRM".into())).unwrap();
        chart
            .handle(&Interaction::Hover(Some("Sales".into())))
            .unwrap();
        chart.handle(&Interaction::Click("Operations".into())).unwrap();
        assert_eq!(chart.selected(), None);
        assert_eq!(chart.hovered(), None);
    }

    #[test]
    fn back_and_breadcrumbs_navigate() {
        let mut chart = chart();
        chart
            .handle(&Interaction::Click("Engineering/Platform".into()))
            .unwrap();
        assert_eq!(chart.tree().name(chart.focus()), "Platform");

        assert!(chart.handle(&Interaction::Back).unwrap());
        assert_eq!(chart.tree().name(chart.focus()), "Engineering");

        chart
            .handle(&Interaction::Click("Engineering/Data".into()))
            .unwrap();
        assert!(chart.handle(&Interaction::Breadcrumb(0)).unwrap());
        assert_eq!(chart.focus(), chart.tree().root());
        assert!(!chart.handle(&Interaction::Back).unwrap());
    }

    #[test]
    fn clicking_a_breadcrumb_key_zooms_out() {
        let mut chart = chart();
        chart
            .handle(&Interaction::Click("Engineering/Platform".into()))
            .unwrap();
        assert!(chart.handle(&Interaction::Click("/".into())).unwrap());
        assert_eq!(chart.focus(), chart.tree().root());
    }

    #[test]
    fn reset_returns_to_root() {
        let mut chart = chart();
        chart.handle(&Interaction::Click("Marketing".into())).unwrap();
        assert!(chart.handle(&Interaction::Reset).unwrap());
        assert_eq!(chart.focus(), chart.tree().root());
        assert!(!chart.handle(&Interaction::Reset).unwrap());
    }

    #[test]
    fn hover_highlights_and_unknown_clears() {
        let mut chart = chart();
        assert!(chart
            .handle(&Interaction::Hover(Some("Sales".into())))
            .unwrap());
        let doc = chart.render(&RenderContext::default());
        let sales = doc.find_by_key("Sales").unwrap();
        let svg = sales.to_string();
        assert!(svg.contains("stroke-width=\"2\""));

        assert!(chart
            .handle(&Interaction::Hover(Some("Nope".into())))
            .unwrap());
        assert_eq!(chart.hovered(), None);
    }

    #[test]
    fn unknown_click_and_unsupported_gestures_error() {
        let mut chart = chart();
        assert!(matches!(
            chart.handle(&Interaction::Click("Legal".into())),
            Err(InteractionError::UnknownTarget { .. })
        ));
        assert!(matches!(
            chart.handle(&Interaction::Sort("value".into())),
            Err(InteractionError::Unsupported { .. })
        ));
    }

    #[test]
    fn unlimited_depth_draws_every_leaf() {
        let chart = chart();
        let mut ctx = RenderContext::default();
        ctx.treemap.max_depth = 0;
        let doc = chart.render(&ctx);
        assert!(doc.find_by_key("Engineering/Platform/Compute").is_some());
    }

    #[test]
    fn empty_tree_renders_placeholder() {
        let tree = TreemapTree::from_weighted(&WeightedNode::branch("Empty", vec![])).unwrap();
        let chart = TreemapChart::new("Nothing", tree);
        let svg = chart.render(&RenderContext::default()).to_string();
        assert!(svg.contains("No data"));
    }

    #[test]
    fn all_zero_tree_renders_placeholder() {
        let tree = TreemapTree::from_weighted(&WeightedNode::branch(
            "Zero",
            vec![WeightedNode::leaf("a", 0.0), WeightedNode::leaf("b", 0.0)],
        ))
        .unwrap();
        let chart = TreemapChart::new("Zero", tree);
        let doc = chart.render(&RenderContext::default());
        assert!(doc.find_by_key("a").is_none());
        assert!(doc.to_string().contains("No data"));
    }

    #[test]
    fn click_is_limited_to_focused_subtree_and_breadcrumbs() {
        let mut chart = chart();
        assert!(chart.handle(&Interaction::Click("Engineering".into())).unwrap());

        for key in ["Sales", "Sales/CRM"] {
            assert!(matches!(
                chart.handle(&Interaction::Click(key.into())),
                Err(InteractionError::UnknownTarget { .. })
            ));
        }
        assert_eq!(chart.tree().path_string(chart.focus()), "Engineering");

        assert!(chart.handle(&Interaction::Click("Engineering/Data".into())).unwrap());
        // Breadcrumb ancestors stay clickable
        assert!(chart.handle(&Interaction::Click("Engineering".into())).unwrap());
        assert_eq!(chart.tree().path_string(chart.focus()), "Engineering");
    }
}
