// ABOUTME: Bullet chart: one horizontal gauge per KPI against its target.
// ABOUTME: Rows can be sorted and clicked open to show the delta to target.

use std::cmp::Ordering;

use deck_core::format;
use deck_layout::{LinearScale, Point, Rect};

use crate::chart::{
    apply_hover, toggle_selection, Chart, ChartKind, Interaction, InteractionError, RenderContext,
};
use crate::svg::{self, Document, Element};

const LABEL_COLUMN: f32 = 130.0;
const VALUE_COLUMN: f32 = 70.0;
const ROW_HEIGHT: f32 = 40.0;
const DETAIL_HEIGHT: f32 = 22.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BulletMetric {
    pub label: String,
    pub unit: String,
    pub value: f64,
    pub target: f64,
    /// Upper bounds of the poor / satisfactory / good bands, ascending
    pub ranges: [f64; 3],
}

impl BulletMetric {
    pub fn new(label: &str, unit: &str, value: f64, target: f64, ranges: [f64; 3]) -> Self {
        Self {
            label: label.to_string(),
            unit: unit.to_string(),
            value,
            target,
            ranges,
        }
    }

    /// value / target; 0 when there is no target
    pub fn attainment(&self) -> f64 {
        if self.target > 0.0 {
            self.value / self.target
        } else {
            0.0
        }
    }

    /// Largest number the row has to show
    pub fn extent(&self) -> f64 {
        self.ranges
            .iter()
            .copied()
            .chain([self.target, self.value])
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletSort {
    Label,
    Value,
    Attainment,
}

impl BulletSort {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "label" => Some(BulletSort::Label),
            "value" => Some(BulletSort::Value),
            "attainment" => Some(BulletSort::Attainment),
            _ => None,
        }
    }

    fn compare(&self, a: &BulletMetric, b: &BulletMetric) -> Ordering {
        match self {
            BulletSort::Label => a.label.to_lowercase().cmp(&b.label.to_lowercase()),
            BulletSort::Value => b.value.total_cmp(&a.value),
            BulletSort::Attainment => b.attainment().total_cmp(&a.attainment()),
        }
    }
}

pub struct BulletChart {
    title: String,
    metrics: Vec<BulletMetric>,
    /// Display order as indices into `metrics`
    order: Vec<usize>,
    sort: Option<BulletSort>,
    expanded: Option<String>,
    hovered: Option<String>,
}

impl BulletChart {
    pub fn new(title: &str, metrics: Vec<BulletMetric>) -> Self {
        let order = (0..metrics.len()).collect();
        Self {
            title: title.to_string(),
            metrics,
            order,
            sort: None,
            expanded: None,
            hovered: None,
        }
    }

    /// Quarterly sales KPIs
    pub fn sample() -> Self {
        Self::new(
            "Quarterly Sales Targets",
            vec![
                BulletMetric::new("Revenue", "$K", 270.0, 250.0, [150.0, 225.0, 300.0]),
                BulletMetric::new("Profit", "%", 22.5, 26.0, [20.0, 25.0, 30.0]),
                BulletMetric::new("Avg Order Size", "$", 520.0, 550.0, [350.0, 500.0, 600.0]),
                BulletMetric::new("New Customers", "", 1650.0, 2100.0, [1400.0, 2000.0, 2500.0]),
                BulletMetric::new("Satisfaction", "/5", 4.6, 4.4, [3.5, 4.25, 5.0]),
            ],
        )
    }

    /// Metric labels in display order
    pub fn row_labels(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|i| self.metrics[*i].label.as_str())
            .collect()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn sort(&self) -> Option<BulletSort> {
        self.sort
    }

    fn knows(&self, key: &str) -> bool {
        self.metrics.iter().any(|m| m.label == key)
    }

    fn apply_sort(&mut self, sort: BulletSort) -> bool {
        let mut order = self.order.clone();
        order.sort_by(|a, b| sort.compare(&self.metrics[*a], &self.metrics[*b]));
        let changed = order != self.order || self.sort != Some(sort);
        self.order = order;
        self.sort = Some(sort);
        changed
    }

    fn render_row(&self, ctx: &RenderContext, metric: &BulletMetric, row: Rect) -> Element {
        let bar_area = Rect::new(
            row.x + LABEL_COLUMN,
            row.y + 6.0,
            (row.width - LABEL_COLUMN - VALUE_COLUMN).max(0.0),
            ROW_HEIGHT - 12.0,
        );
        let scale = LinearScale::new(
            (0.0, metric.extent()),
            (bar_area.x as f64, bar_area.right() as f64),
        );
        let x = |v: f64| scale.map_clamped(v) as f32;

        let hovered = self.hovered.as_deref() == Some(metric.label.as_str());
        let mut group = svg::group().key(&metric.label).class("metric");

        if hovered {
            group.push(
                svg::rect(Rect::new(row.x, row.y, row.width, ROW_HEIGHT))
                    .fill(ctx.palette.grid)
                    .opacity(0.5),
            );
        }

        let name = format::fit_label(&metric.label, LABEL_COLUMN - 8.0, ctx.font_size)
            .unwrap_or_default();
        group.push(
            ctx.label(
                Point::new(row.x, row.y + ROW_HEIGHT / 2.0),
                &name,
                ctx.palette.foreground,
            )
            .attr("font-weight", "600"),
        );
        if !metric.unit.is_empty() {
            group.push(ctx.small_label(
                Point::new(row.x, row.y + ROW_HEIGHT / 2.0 + ctx.font_size),
                &metric.unit,
            ));
        }

        // Widest band first so the narrower ones paint over it
        for (band, upper) in metric.ranges.iter().enumerate().rev() {
            let shade = 0.25 + 0.25 * band as f32;
            group.push(
                svg::rect(Rect::new(
                    bar_area.x,
                    bar_area.y,
                    x(*upper) - bar_area.x,
                    bar_area.height,
                ))
                .fill(ctx.palette.muted.lighten(shade))
                .class("band"),
            );
        }

        let measure_height = bar_area.height / 3.0;
        group.push(
            svg::rect(Rect::new(
                bar_area.x,
                bar_area.y + measure_height,
                x(metric.value) - bar_area.x,
                measure_height,
            ))
            .fill(ctx.palette.foreground)
            .class("measure"),
        );

        let target_x = x(metric.target);
        group.push(
            svg::line(
                Point::new(target_x, bar_area.y + 2.0),
                Point::new(target_x, bar_area.bottom() - 2.0),
            )
            .stroke(ctx.palette.accent, 2.5)
            .class("target"),
        );

        let value_color = if metric.value >= metric.target {
            ctx.palette.ok
        } else {
            ctx.palette.warning
        };
        group.push(ctx.label(
            Point::new(bar_area.right() + 8.0, row.y + ROW_HEIGHT / 2.0 + 4.0),
            &format::with_unit(metric.value, &metric.unit),
            value_color,
        ));

        group.child(svg::title(&format!(
            "{}: {} (target {})",
            metric.label,
            format::with_unit(metric.value, &metric.unit),
            format::with_unit(metric.target, &metric.unit)
        )))
    }

    fn render_detail(&self, ctx: &RenderContext, metric: &BulletMetric, at: Point) -> Element {
        let delta = if metric.target > 0.0 {
            metric.attainment() - 1.0
        } else {
            0.0
        };
        let color = if delta >= 0.0 {
            ctx.palette.ok
        } else {
            ctx.palette.critical
        };
        let summary = format!(
            "{} vs target {} ({} attained)",
            format::signed_percent(delta, 1),
            format::with_unit(metric.target, &metric.unit),
            format::percent(metric.attainment(), 0)
        );
        ctx.label(at, &summary, color).class("detail")
    }
}

impl Chart for BulletChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Bullet
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn handle(&mut self, interaction: &Interaction) -> Result<bool, InteractionError> {
        match interaction {
            Interaction::Hover(key) => {
                let known = key.as_deref().is_some_and(|k| self.knows(k));
                Ok(apply_hover(&mut self.hovered, key.as_deref(), known))
            }
            Interaction::Click(key) => {
                if !self.knows(key) {
                    return Err(InteractionError::UnknownTarget {
                        chart: self.kind().name(),
                        key: key.clone(),
                    });
                }
                toggle_selection(&mut self.expanded, key);
                tracing::debug!("Bullet row expanded: {:?}", self.expanded);
                Ok(true)
            }
            Interaction::Sort(key) => {
                let sort =
                    BulletSort::from_key(key).ok_or_else(|| InteractionError::UnknownSort {
                        chart: self.kind().name(),
                        key: key.clone(),
                    })?;
                Ok(self.apply_sort(sort))
            }
            Interaction::Reset => {
                let initial: Vec<usize> = (0..self.metrics.len()).collect();
                let changed = self.order != initial
                    || self.sort.is_some()
                    || self.expanded.is_some()
                    || self.hovered.is_some();
                self.order = initial;
                self.sort = None;
                self.expanded = None;
                self.hovered = None;
                Ok(changed)
            }
            Interaction::Back
            | Interaction::Breadcrumb(_)
            | Interaction::Filter(_)
            | Interaction::Toggle(_) => {
                Err(InteractionError::unsupported(self.kind(), interaction))
            }
        }
    }

    fn render(&self, ctx: &RenderContext) -> Document {
        let mut doc = ctx.document(&self.title);
        let body = ctx.body();

        if let Some(sort) = self.sort {
            let name = match sort {
                BulletSort::Label => "label",
                BulletSort::Value => "value",
                BulletSort::Attainment => "attainment",
            };
            doc.push(ctx.small_label(
                Point::new(body.right() - 120.0, 24.0),
                &format!("sorted by {}", name),
            ));
        }

        let mut rows = svg::group().class("rows");
        let mut y = body.y;
        for index in &self.order {
            let metric = &self.metrics[*index];
            let row = Rect::new(body.x, y, body.width, ROW_HEIGHT);
            rows.push(self.render_row(ctx, metric, row));
            y += ROW_HEIGHT;

            if self.expanded.as_deref() == Some(metric.label.as_str()) {
                rows.push(self.render_detail(
                    ctx,
                    metric,
                    Point::new(body.x + LABEL_COLUMN, y + DETAIL_HEIGHT * 0.6),
                ));
                y += DETAIL_HEIGHT;
            }
        }
        doc.push(rows);
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_renders_a_row_per_metric() {
        let chart = BulletChart::sample();
        let doc = chart.render(&RenderContext::default());
        let keys = doc.keys();
        assert_eq!(keys.len(), 5);
        assert!(keys.contains(&"Revenue".to_string()));
        assert_eq!(doc.root.count_tag("line"), 5);
    }

    #[test]
    fn extent_covers_value_past_ranges() {
        let metric = BulletMetric::new("x", "", 120.0, 90.0, [50.0, 80.0, 100.0]);
        assert_eq!(metric.extent(), 120.0);
        assert!((metric.attainment() - 120.0 / 90.0).abs() < 1e-9);
        let no_target = BulletMetric::new("y", "", 5.0, 0.0, [1.0, 2.0, 3.0]);
        assert_eq!(no_target.attainment(), 0.0);
    }

    #[test]
    fn sorts_by_each_key() {
        let mut chart = BulletChart::sample();
        assert!(chart.handle(&Interaction::Sort("value".into())).unwrap());
        assert_eq!(
            chart.row_labels(),
            vec!["New Customers", "Avg Order Size", "Revenue", "Profit", "Satisfaction"]
        );
        // Same sort again is a no-op
        assert!(!chart.handle(&Interaction::Sort("value".into())).unwrap());

        chart.handle(&Interaction::Sort("attainment".into())).unwrap();
        assert_eq!(chart.row_labels()[0], "Revenue");
        assert_eq!(chart.row_labels()[4], "New Customers");

        chart.handle(&Interaction::Sort("Label".into())).unwrap();
        assert_eq!(chart.row_labels()[0], "Avg Order Size");
        assert_eq!(chart.sort(), Some(BulletSort::Label));
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let mut chart = BulletChart::sample();
        assert_eq!(
            chart.handle(&Interaction::Sort("color".into())),
            Err(InteractionError::UnknownSort {
                chart: "bullet",
                key: "color".into()
            })
        );
    }

    #[test]
    fn click_toggles_detail_row() {
        let mut chart = BulletChart::sample();
        let ctx = RenderContext::default();
        assert!(chart.handle(&Interaction::Click("Revenue".into())).unwrap());
        assert_eq!(chart.expanded(), Some("Revenue"));
        let svg = chart.render(&ctx).to_string();
        assert!(svg.contains("+8.0% vs target 250 $K"));

        chart.handle(&Interaction::Click("Profit".into())).unwrap();
        assert_eq!(chart.expanded(), Some("Profit"));
        chart.handle(&Interaction::Click("Profit".into())).unwrap();
        assert_eq!(chart.expanded(), None);
        assert!(!chart.render(&ctx).to_string().contains("vs target"));
    }

    #[test]
    fn click_unknown_row_is_error() {
        let mut chart = BulletChart::sample();
        assert!(matches!(
            chart.handle(&Interaction::Click("Churn".into())),
            Err(InteractionError::UnknownTarget { .. })
        ));
    }

    #[test]
    fn reset_restores_initial_order() {
        let mut chart = BulletChart::sample();
        chart.handle(&Interaction::Sort("value".into())).unwrap();
        chart.handle(&Interaction::Click("Profit".into())).unwrap();
        assert!(chart.handle(&Interaction::Reset).unwrap());
        assert_eq!(chart.row_labels()[0], "Revenue");
        assert_eq!(chart.expanded(), None);
        assert!(!chart.handle(&Interaction::Reset).unwrap());
    }

    #[test]
    fn hover_and_unsupported() {
        let mut chart = BulletChart::sample();
        assert!(chart.handle(&Interaction::Hover(Some("Profit".into()))).unwrap());
        assert!(chart.handle(&Interaction::Hover(Some("nope".into()))).unwrap());
        assert!(!chart.handle(&Interaction::Hover(None)).unwrap());
        assert!(matches!(
            chart.handle(&Interaction::Toggle("x".into())),
            Err(InteractionError::Unsupported { .. })
        ));
    }
}
