// ABOUTME: Radar (spider) chart comparing a few series across shared axes.
// ABOUTME: Legend entries toggle series on and off; hovering a series highlights it.

use deck_layout::polar::{self, points_attr};
use deck_layout::{Direction, Point, Rect};

use crate::chart::{apply_hover, Chart, ChartKind, Interaction, InteractionError, RenderContext};
use crate::svg::{self, Document, Element};

const RINGS: usize = 4;
const LEGEND_WIDTH: f32 = 140.0;
const LABEL_GAP: f32 = 14.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub name: String,
    /// One value per axis, in axis order
    pub values: Vec<f64>,
}

impl RadarSeries {
    pub fn new(name: &str, values: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            values: values.to_vec(),
        }
    }
}

pub struct RadarChart {
    title: String,
    axes: Vec<String>,
    series: Vec<RadarSeries>,
    /// Value at the outer ring
    max: f64,
    hidden: Vec<bool>,
    hovered: Option<String>,
}

impl RadarChart {
    pub fn new(title: &str, axes: &[&str], series: Vec<RadarSeries>, max: f64) -> Self {
        let hidden = vec![false; series.len()];
        Self {
            title: title.to_string(),
            axes: axes.iter().map(|a| a.to_string()).collect(),
            series,
            max,
            hidden,
            hovered: None,
        }
    }

    /// Review scores for three laptops, out of 10
    pub fn sample() -> Self {
        Self::new(
            "Laptop Comparison",
            &["Performance", "Battery", "Display", "Portability", "Price", "Build"],
            vec![
                RadarSeries::new("Model A", &[9.0, 6.5, 8.5, 5.0, 4.0, 9.0]),
                RadarSeries::new("Model B", &[7.0, 9.0, 7.0, 8.5, 6.5, 7.5]),
                RadarSeries::new("Model C", &[5.5, 7.5, 6.0, 9.0, 9.0, 6.0]),
            ],
            10.0,
        )
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.index_of(name).is_some_and(|i| !self.hidden[i])
    }

    pub fn visible_count(&self) -> usize {
        self.hidden.iter().filter(|h| !**h).count()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.series.iter().position(|s| s.name == name)
    }

    fn toggle(&mut self, name: &str) -> Result<bool, InteractionError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| InteractionError::UnknownTarget {
                chart: self.kind().name(),
                key: name.to_string(),
            })?;

        if !self.hidden[index] && self.visible_count() == 1 {
            tracing::debug!("Keeping '{}' visible: it is the last series shown", name);
            return Ok(false);
        }
        self.hidden[index] = !self.hidden[index];
        if self.hidden[index] && self.hovered.as_deref() == Some(name) {
            self.hovered = None;
        }
        Ok(true)
    }

    /// Values padded or cut to the axis count
    fn aligned_values(&self, series: &RadarSeries) -> Vec<f64> {
        (0..self.axes.len())
            .map(|i| series.values.get(i).copied().unwrap_or(0.0))
            .collect()
    }

    fn render_grid(&self, ctx: &RenderContext, center: Point, radius: f32) -> Element {
        let count = self.axes.len();
        let mut grid = svg::group().class("grid");

        for ring in 1..=RINGS {
            let r = radius * ring as f32 / RINGS as f32;
            grid.push(
                svg::polygon(&points_attr(&polar::ring_points(count, center, r)))
                    .attr("fill", "none")
                    .stroke(ctx.palette.grid, 1.0),
            );
        }

        for (i, axis) in self.axes.iter().enumerate() {
            let angle = polar::axis_angle(i, count);
            let tip = polar::polar_point(center, radius, angle);
            grid.push(svg::line(center, tip).stroke(ctx.palette.grid, 1.0));

            let at = polar::polar_point(center, radius + LABEL_GAP, angle);
            let anchor = if (at.x - center.x).abs() < 1.0 {
                "middle"
            } else if at.x > center.x {
                "start"
            } else {
                "end"
            };
            grid.push(
                ctx.label(Point::new(at.x, at.y + ctx.font_size * 0.35), axis, ctx.palette.muted)
                    .attr("text-anchor", anchor),
            );
        }
        grid
    }

    fn render_series(
        &self,
        ctx: &RenderContext,
        index: usize,
        center: Point,
        radius: f32,
    ) -> Element {
        let series = &self.series[index];
        let color = ctx.palette.series_color(index);
        let points = polar::radar_points(&self.aligned_values(series), self.max, center, radius);

        let highlighted = self.hovered.as_deref() == Some(series.name.as_str());
        let dimmed = self.hovered.is_some() && !highlighted;

        let mut group = svg::group().key(&series.name).class("series").child(
            svg::polygon(&points_attr(&points))
                .fill(color.with_alpha(if highlighted { 0.35 } else { 0.18 }))
                .stroke(color, if highlighted { 3.0 } else { 1.5 }),
        );
        for point in &points {
            group.push(svg::circle(*point, 3.0).fill(color));
        }
        if dimmed {
            group = group.opacity(0.3);
        }
        group.child(svg::title(&series.name))
    }

    fn render_legend(&self, ctx: &RenderContext, area: Rect) -> Element {
        let mut legend = svg::group().class("legend");
        for (i, series) in self.series.iter().enumerate() {
            let y = area.y + 8.0 + i as f32 * (ctx.font_size + 10.0);
            let mut item = svg::group()
                .key(&series.name)
                .class(if self.hidden[i] { "legend-item hidden" } else { "legend-item" })
                .child(
                    svg::rect(Rect::new(area.x, y, 12.0, 12.0)).fill(ctx.palette.series_color(i)),
                )
                .child(ctx.label(
                    Point::new(area.x + 18.0, y + 10.0),
                    &series.name,
                    ctx.palette.foreground,
                ));
            if self.hidden[i] {
                item = item.opacity(0.4);
            }
            legend.push(item);
        }
        legend
    }
}

impl Chart for RadarChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Radar
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn handle(&mut self, interaction: &Interaction) -> Result<bool, InteractionError> {
        match interaction {
            Interaction::Hover(key) => {
                let known = key.as_deref().is_some_and(|k| self.is_visible(k));
                Ok(apply_hover(&mut self.hovered, key.as_deref(), known))
            }
            // A series or its legend entry
            Interaction::Click(name) | Interaction::Toggle(name) => self.toggle(name),
            Interaction::Reset => {
                let changed = self.hidden.iter().any(|h| *h) || self.hovered.is_some();
                self.hidden.iter_mut().for_each(|h| *h = false);
                self.hovered = None;
                Ok(changed)
            }
            Interaction::Back
            | Interaction::Breadcrumb(_)
            | Interaction::Filter(_)
            | Interaction::Sort(_) => Err(InteractionError::unsupported(self.kind(), interaction)),
        }
    }

    fn render(&self, ctx: &RenderContext) -> Document {
        let mut doc = ctx.document(&self.title);
        let body = ctx.body();
        let (plot, legend_area) =
            body.take(Direction::Horizontal, (body.width - LEGEND_WIDTH).max(0.0));

        let center = plot.center();
        let radius =
            (plot.width.min(plot.height) / 2.0 - LABEL_GAP - ctx.font_size * 2.0).max(0.0);
        if self.axes.len() < 3 || radius <= 0.0 {
            doc.push(ctx.label(plot.center(), "Not enough axes", ctx.palette.muted));
            return doc;
        }

        doc.push(self.render_grid(ctx, center, radius));

        let mut layers = svg::group().class("series-layer");
        for index in (0..self.series.len()).filter(|i| !self.hidden[*i]) {
            layers.push(self.render_series(ctx, index, center, radius));
        }
        doc.push(layers);
        doc.push(self.render_legend(ctx, legend_area));
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_draws_rings_and_series() {
        let chart = RadarChart::sample();
        let doc = chart.render(&RenderContext::default());
        // 4 grid rings + 3 series polygons
        assert_eq!(doc.count_tag("polygon"), 7);
        assert_eq!(doc.count_tag("circle"), 18);
        // Spokes
        assert_eq!(doc.count_tag("line"), 6);
        assert!(doc.to_string().contains("Portability"));
    }

    #[test]
    fn toggle_hides_and_shows_series() {
        let mut chart = RadarChart::sample();
        let ctx = RenderContext::default();
        assert!(chart.handle(&Interaction::Toggle("Model B".into())).unwrap());
        assert!(!chart.is_visible("Model B"));
        assert_eq!(chart.render(&ctx).count_tag("polygon"), 6);

        // Legend still lists the hidden series
        let svg = chart.render(&ctx).to_string();
        assert!(svg.contains("legend-item hidden"));

        assert!(chart.handle(&Interaction::Click("Model B".into())).unwrap());
        assert!(chart.is_visible("Model B"));
    }

    #[test]
    fn last_visible_series_stays() {
        let mut chart = RadarChart::sample();
        chart.handle(&Interaction::Toggle("Model A".into())).unwrap();
        chart.handle(&Interaction::Toggle("Model B".into())).unwrap();
        assert_eq!(chart.visible_count(), 1);
        assert!(!chart.handle(&Interaction::Toggle("Model C".into())).unwrap());
        assert!(chart.is_visible("Model C"));
    }

    #[test]
    fn unknown_series_is_error() {
        let mut chart = RadarChart::sample();
        assert_eq!(
            chart.handle(&Interaction::Toggle("Model Z".into())),
            Err(InteractionError::UnknownTarget {
                chart: "radar",
                key: "Model Z".into()
            })
        );
    }

    #[test]
    fn hover_highlights_visible_series_only() {
        let mut chart = RadarChart::sample();
        assert!(chart.handle(&Interaction::Hover(Some("Model A".into()))).unwrap());
        assert_eq!(chart.hovered(), Some("Model A"));

        let doc = chart.render(&RenderContext::default());
        let dimmed = doc.find_by_key("Model B").unwrap();
        assert_eq!(dimmed.get_attr("opacity"), Some("0.3"));

        // Hiding the hovered series drops the highlight
        chart.handle(&Interaction::Toggle("Model A".into())).unwrap();
        assert_eq!(chart.hovered(), None);
        chart.handle(&Interaction::Hover(Some("Model A".into()))).unwrap();
        assert_eq!(chart.hovered(), None);
    }

    #[test]
    fn reset_shows_everything() {
        let mut chart = RadarChart::sample();
        chart.handle(&Interaction::Toggle("Model C".into())).unwrap();
        assert!(chart.handle(&Interaction::Reset).unwrap());
        assert_eq!(chart.visible_count(), 3);
        assert!(!chart.handle(&Interaction::Reset).unwrap());
        assert!(matches!(
            chart.handle(&Interaction::Sort("name".into())),
            Err(InteractionError::Unsupported { .. })
        ));
    }

    #[test]
    fn short_values_are_padded() {
        let chart = RadarChart::new(
            "t",
            &["a", "b", "c"],
            vec![RadarSeries::new("s", &[1.0])],
            2.0,
        );
        assert_eq!(chart.aligned_values(&chart.series[0]), vec![1.0, 0.0, 0.0]);
    }
}
