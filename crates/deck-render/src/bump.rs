// ABOUTME: Bump chart of rank changes across periods.
// ABOUTME: Hover highlights a series and dims the rest; click pins the highlight.

use deck_core::format;
use deck_layout::{curve, BandScale, LinearScale, Point, Rect};

use crate::chart::{
    apply_hover, toggle_selection, Chart, ChartKind, Interaction, InteractionError, RenderContext,
};
use crate::svg::{self, Document, Element};

const NAME_COLUMN: f32 = 90.0;
const AXIS_HEIGHT: f32 = 24.0;
const DOT_RADIUS: f32 = 4.5;

#[derive(Debug, Clone, PartialEq)]
pub struct BumpSeries {
    pub name: String,
    /// Rank per period, 1 = best
    pub ranks: Vec<u32>,
}

impl BumpSeries {
    pub fn new(name: &str, ranks: &[u32]) -> Self {
        Self {
            name: name.to_string(),
            ranks: ranks.to_vec(),
        }
    }
}

/// Vertical scale putting rank 1 on the top edge of `plot`
pub fn rank_scale(max_rank: u32, plot: Rect) -> LinearScale {
    LinearScale::new(
        (1.0, max_rank.max(1) as f64),
        (plot.y as f64, plot.bottom() as f64),
    )
}

pub struct BumpChart {
    title: String,
    periods: Vec<String>,
    series: Vec<BumpSeries>,
    hovered: Option<String>,
    pinned: Option<String>,
}

impl BumpChart {
    pub fn new(title: &str, periods: &[&str], series: Vec<BumpSeries>) -> Self {
        Self {
            title: title.to_string(),
            periods: periods.iter().map(|p| p.to_string()).collect(),
            series,
            hovered: None,
            pinned: None,
        }
    }

    /// Five teams ranked by velocity over six sprints
    pub fn sample() -> Self {
        Self::new(
            "Team Velocity Rank by Sprint",
            &["Sprint 1", "Sprint 2", "Sprint 3", "Sprint 4", "Sprint 5", "Sprint 6"],
            vec![
                BumpSeries::new("Atlas", &[1, 2, 3, 2, 1, 1]),
                BumpSeries::new("Borealis", &[2, 1, 1, 3, 4, 5]),
                BumpSeries::new("Comet", &[3, 3, 2, 1, 2, 3]),
                BumpSeries::new("Drift", &[4, 5, 5, 4, 3, 2]),
                BumpSeries::new("Ember", &[5, 4, 4, 5, 5, 4]),
            ],
        )
    }

    /// The pinned series if any, otherwise the hovered one
    pub fn highlighted(&self) -> Option<&str> {
        self.pinned.as_deref().or(self.hovered.as_deref())
    }

    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    fn knows(&self, name: &str) -> bool {
        self.series.iter().any(|s| s.name == name)
    }

    fn max_rank(&self) -> u32 {
        self.series
            .iter()
            .flat_map(|s| s.ranks.iter().copied())
            .max()
            .unwrap_or(1)
    }

    fn render_series(
        &self,
        ctx: &RenderContext,
        index: usize,
        x: &BandScale,
        y: &LinearScale,
    ) -> Element {
        let series = &self.series[index];
        let color = ctx.palette.series_color(index);
        let highlighted = self.highlighted() == Some(series.name.as_str());
        let dimmed = self.highlighted().is_some() && !highlighted;

        let points: Vec<Point> = series
            .ranks
            .iter()
            .take(self.periods.len())
            .enumerate()
            .map(|(i, rank)| Point::new(x.center(i) as f32, y.map(*rank as f64) as f32))
            .collect();

        let mut group = svg::group().key(&series.name).class("series").child(
            svg::path(&curve::bump_path(&points))
                .attr("fill", "none")
                .stroke(color, if highlighted { 5.0 } else { 3.0 }),
        );

        for (i, point) in points.iter().enumerate() {
            group.push(
                svg::circle(*point, DOT_RADIUS)
                    .fill(color)
                    .stroke(ctx.palette.background, 1.5)
                    .child(svg::title(&format!(
                        "{}: {} in {}",
                        series.name,
                        format::ordinal(series.ranks[i]),
                        self.periods[i]
                    ))),
            );
        }

        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            let weight = if highlighted { "700" } else { "400" };
            group.push(
                ctx.label(
                    Point::new(first.x - DOT_RADIUS - 6.0, first.y + 4.0),
                    &series.name,
                    color,
                )
                .attr("text-anchor", "end")
                .attr("font-weight", weight),
            );
            group.push(
                ctx.label(
                    Point::new(last.x + DOT_RADIUS + 6.0, last.y + 4.0),
                    &series.name,
                    color,
                )
                .attr("font-weight", weight),
            );
        }

        if dimmed {
            group = group.opacity(0.2);
        }
        group
    }
}

impl Chart for BumpChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Bump
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
            Interaction::Click(name) => {
                if !self.knows(name) {
                    return Err(InteractionError::UnknownTarget {
                        chart: self.kind().name(),
                        key: name.clone(),
                    });
                }
                toggle_selection(&mut self.pinned, name);
                tracing::debug!("Bump highlight pinned: {:?}", self.pinned);
                Ok(true)
            }
            Interaction::Reset => {
                let changed = self.hovered.is_some() || self.pinned.is_some();
                self.hovered = None;
                self.pinned = None;
                Ok(changed)
            }
            Interaction::Back
            | Interaction::Breadcrumb(_)
            | Interaction::Filter(_)
            | Interaction::Sort(_)
            | Interaction::Toggle(_) => {
                Err(InteractionError::unsupported(self.kind(), interaction))
            }
        }
    }

    fn render(&self, ctx: &RenderContext) -> Document {
        let mut doc = ctx.document(&self.title);
        let body = ctx.body();
        if self.periods.is_empty() || self.series.is_empty() {
            doc.push(ctx.label(body.center(), "No data", ctx.palette.muted));
            return doc;
        }

        let plot = Rect::new(
            body.x + NAME_COLUMN,
            body.y + 10.0,
            (body.width - 2.0 * NAME_COLUMN).max(0.0),
            (body.height - AXIS_HEIGHT - 10.0).max(0.0),
        );
        let x = BandScale::new(
            self.periods.len(),
            (plot.x as f64, plot.right() as f64),
            0.0,
        );
        let y = rank_scale(self.max_rank(), plot);

        let mut axis = svg::group().class("periods");
        for (i, period) in self.periods.iter().enumerate() {
            let cx = x.center(i) as f32;
            axis.push(
                svg::line(Point::new(cx, plot.y), Point::new(cx, plot.bottom()))
                    .stroke(ctx.palette.grid, 1.0),
            );
            axis.push(
                ctx.small_label(Point::new(cx, body.bottom() - 6.0), period)
                    .attr("text-anchor", "middle"),
            );
        }
        doc.push(axis);

        // Highlighted series last so it paints on top
        let mut order: Vec<usize> = (0..self.series.len()).collect();
        if let Some(name) = self.highlighted() {
            order.sort_by_key(|i| self.series[*i].name == name);
        }
        let mut lines = svg::group().class("series-layer");
        for index in order {
            lines.push(self.render_series(ctx, index, &x, &y));
        }
        doc.push(lines);
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_draws_a_line_per_series() {
        let chart = BumpChart::sample();
        let doc = chart.render(&RenderContext::default());
        assert_eq!(doc.count_tag("path"), 5);
        assert_eq!(doc.count_tag("circle"), 30);
        assert!(doc.to_string().contains("Atlas: 3rd in Sprint 3"));
    }

    #[test]
    fn rank_one_is_on_top() {
        let plot = Rect::new(0.0, 100.0, 200.0, 400.0);
        let scale = rank_scale(5, plot);
        assert_eq!(scale.map(1.0), 100.0);
        assert_eq!(scale.map(5.0), 500.0);
        assert!(scale.map(2.0) < scale.map(3.0));
    }

    #[test]
    fn hover_dims_other_series() {
        let mut chart = BumpChart::sample();
        assert!(chart.handle(&Interaction::Hover(Some("Comet".into()))).unwrap());
        let doc = chart.render(&RenderContext::default());
        assert_eq!(doc.find_by_key("Atlas").unwrap().get_attr("opacity"), Some("0.2"));
        assert_eq!(doc.find_by_key("Comet").unwrap().get_attr("opacity"), None);

        // Highlighted series is drawn last
        assert_eq!(doc.keys().last().map(String::as_str), Some("Comet"));
    }

    #[test]
    fn click_pins_over_hover() {
        let mut chart = BumpChart::sample();
        chart.handle(&Interaction::Click("Drift".into())).unwrap();
        chart.handle(&Interaction::Hover(Some("Ember".into()))).unwrap();
        assert_eq!(chart.highlighted(), Some("Drift"));

        chart.handle(&Interaction::Click("Drift".into())).unwrap();
        assert_eq!(chart.pinned(), None);
        assert_eq!(chart.highlighted(), Some("Ember"));
    }

    #[test]
    fn unknown_series_and_reset() {
        let mut chart = BumpChart::sample();
        assert!(matches!(
            chart.handle(&Interaction::Click("Zephyr".into())),
            Err(InteractionError::UnknownTarget { .. })
        ));
        assert!(!chart.handle(&Interaction::Reset).unwrap());
        chart.handle(&Interaction::Click("Atlas".into())).unwrap();
        assert!(chart.handle(&Interaction::Reset).unwrap());
        assert_eq!(chart.highlighted(), None);
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let chart = BumpChart::new("Empty", &[], Vec::new());
        let svg = chart.render(&RenderContext::default()).to_string();
        assert!(svg.contains("No data"));
    }
}
