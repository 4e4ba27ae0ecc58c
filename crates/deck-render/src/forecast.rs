// ABOUTME: Capacity forecast: history line, projected mean with a confidence band,
// ABOUTME: and the point where the projection first crosses capacity.

use deck_core::format;
use deck_layout::{curve, LinearScale, Point, Rect};

use crate::chart::{apply_hover, Chart, ChartKind, Interaction, InteractionError, RenderContext};
use crate::svg::{self, Document, Element};

const Y_AXIS_WIDTH: f32 = 56.0;
const X_AXIS_HEIGHT: f32 = 24.0;
const TICKS: usize = 5;

pub const BAND_TOGGLE: &str = "band";
pub const CAPACITY_TOGGLE: &str = "capacity";
pub const BREACH_KEY: &str = "breach";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    pub fn new(mean: f64, lower: f64, upper: f64) -> Self {
        Self { mean, lower, upper }
    }
}

/// First position where the series reaches `capacity`, as a fractional index
/// into `history` followed by the forecast means. Interpolates linearly
/// between the last point below capacity and the first at or above it.
pub fn capacity_breach(
    history: &[f64],
    forecast: &[ForecastPoint],
    capacity: f64,
) -> Option<f64> {
    let values: Vec<f64> = history
        .iter()
        .copied()
        .chain(forecast.iter().map(|p| p.mean))
        .collect();

    let hit = values.iter().position(|v| *v >= capacity)?;
    if hit == 0 {
        return Some(0.0);
    }
    let (before, after) = (values[hit - 1], values[hit]);
    let t = (capacity - before) / (after - before);
    Some((hit - 1) as f64 + t)
}

pub struct ForecastChart {
    title: String,
    unit: String,
    /// One per history point followed by one per forecast point
    labels: Vec<String>,
    history: Vec<f64>,
    forecast: Vec<ForecastPoint>,
    capacity: Option<f64>,
    show_band: bool,
    show_capacity: bool,
    hovered: Option<String>,
}

impl ForecastChart {
    pub fn new(
        title: &str,
        unit: &str,
        labels: &[&str],
        history: Vec<f64>,
        forecast: Vec<ForecastPoint>,
    ) -> Self {
        Self {
            title: title.to_string(),
            unit: unit.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            history,
            forecast,
            capacity: None,
            show_band: true,
            show_capacity: true,
            hovered: None,
        }
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Six months of storage use and a six month projection
    pub fn sample() -> Self {
        let forecast = [65.0, 69.0, 74.0, 78.0, 83.0, 88.0]
            .iter()
            .enumerate()
            .map(|(i, mean)| {
                let spread = 2.0 * (i + 1) as f64;
                ForecastPoint::new(*mean, mean - spread, mean + spread)
            })
            .collect();
        Self::new(
            "Storage Capacity Forecast",
            "TB",
            &[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ],
            vec![42.0, 45.0, 49.0, 52.0, 57.0, 61.0],
            forecast,
        )
        .with_capacity(80.0)
    }

    pub fn show_band(&self) -> bool {
        self.show_band
    }

    pub fn show_capacity(&self) -> bool {
        self.show_capacity
    }

    /// Fractional index of the first capacity crossing, if any
    pub fn breach(&self) -> Option<f64> {
        self.capacity
            .and_then(|c| capacity_breach(&self.history, &self.forecast, c))
    }

    fn len(&self) -> usize {
        self.history.len() + self.forecast.len()
    }

    fn label(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{}", index + 1))
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        (0..self.len()).find(|i| self.label(*i) == label)
    }

    fn value(&self, index: usize) -> f64 {
        match self.history.get(index) {
            Some(v) => *v,
            None => self.forecast[index - self.history.len()].mean,
        }
    }

    fn value_domain(&self) -> (f64, f64) {
        let values = self
            .history
            .iter()
            .copied()
            .chain(self.forecast.iter().flat_map(|p| [p.lower, p.upper]))
            .chain(self.capacity);
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if lo.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        }
    }

    fn readout(&self, index: usize) -> String {
        let label = self.label(index);
        match index.checked_sub(self.history.len()) {
            None => format!("{}: {}", label, format::with_unit(self.value(index), &self.unit)),
            Some(f) => {
                let p = self.forecast[f];
                format!(
                    "{}: {} forecast, {} to {}",
                    label,
                    format::with_unit(p.mean, &self.unit),
                    format::with_unit(p.lower, &self.unit),
                    format::with_unit(p.upper, &self.unit)
                )
            }
        }
    }

    fn render_axes(
        &self,
        ctx: &RenderContext,
        plot: Rect,
        x: &LinearScale,
        y: &LinearScale,
    ) -> Element {
        let mut axes = svg::group().class("axes");
        for tick in y.ticks(TICKS) {
            let py = y.map(tick) as f32;
            axes.push(
                svg::line(Point::new(plot.x, py), Point::new(plot.right(), py))
                    .stroke(ctx.palette.grid, 1.0),
            );
            axes.push(
                ctx.small_label(
                    Point::new(plot.x - 8.0, py + 4.0),
                    &format::with_unit(tick, &self.unit),
                )
                .attr("text-anchor", "end"),
            );
        }
        for i in 0..self.len() {
            let label = self.label(i);
            let px = x.map(i as f64) as f32;
            axes.push(
                ctx.small_label(Point::new(px, plot.bottom() + 16.0), &label)
                    .attr("text-anchor", "middle")
                    .key(&label),
            );
        }
        axes
    }

    fn render_capacity(
        &self,
        ctx: &RenderContext,
        plot: Rect,
        x: &LinearScale,
        y: &LinearScale,
        capacity: f64,
    ) -> Element {
        let py = y.map(capacity) as f32;
        let mut group = svg::group()
            .class("capacity")
            .child(
                svg::line(Point::new(plot.x, py), Point::new(plot.right(), py))
                    .stroke(ctx.palette.critical, 1.5)
                    .attr("stroke-dasharray", "2 3"),
            )
            .child(
                ctx.label(
                    Point::new(plot.x + 6.0, py - 6.0),
                    &format!("Capacity {}", format::with_unit(capacity, &self.unit)),
                    ctx.palette.critical,
                )
                .num("font-size", ctx.font_size * 0.85),
            );

        if let Some(at) = self.breach() {
            let px = x.map(at) as f32;
            let month = self.label(at.round() as usize);
            group.push(
                svg::group()
                    .key(BREACH_KEY)
                    .class("breach")
                    .child(
                        svg::line(Point::new(px, py), Point::new(px, plot.bottom()))
                            .stroke(ctx.palette.critical, 1.0),
                    )
                    .child(
                        svg::circle(Point::new(px, py), 5.0)
                            .fill(ctx.palette.background)
                            .stroke(ctx.palette.critical, 2.0),
                    )
                    .child(
                        ctx.label(
                            Point::new(px, py - 12.0),
                            &format!("Capacity reached in {}", month),
                            ctx.palette.critical,
                        )
                        .attr("text-anchor", "middle")
                        .attr("font-weight", "600"),
                    ),
            );
        }
        group
    }
}

impl Chart for ForecastChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Forecast
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn handle(&mut self, interaction: &Interaction) -> Result<bool, InteractionError> {
        match interaction {
            Interaction::Hover(key) => {
                let known = key.as_deref().is_some_and(|k| self.index_of(k).is_some());
                Ok(apply_hover(&mut self.hovered, key.as_deref(), known))
            }
            Interaction::Toggle(name) if name == BAND_TOGGLE => {
                self.show_band = !self.show_band;
                Ok(true)
            }
            Interaction::Toggle(name) if name == CAPACITY_TOGGLE && self.capacity.is_some() => {
                self.show_capacity = !self.show_capacity;
                Ok(true)
            }
            Interaction::Toggle(name) => Err(InteractionError::UnknownTarget {
                chart: self.kind().name(),
                key: name.clone(),
            }),
            Interaction::Reset => {
                let changed = !self.show_band || !self.show_capacity || self.hovered.is_some();
                self.show_band = true;
                self.show_capacity = true;
                self.hovered = None;
                Ok(changed)
            }
            Interaction::Click(_)
            | Interaction::Back
            | Interaction::Breadcrumb(_)
            | Interaction::Filter(_)
            | Interaction::Sort(_) => Err(InteractionError::unsupported(self.kind(), interaction)),
        }
    }

    fn render(&self, ctx: &RenderContext) -> Document {
        let mut doc = ctx.document(&self.title);
        let body = ctx.body();
        if self.history.is_empty() {
            doc.push(ctx.label(body.center(), "No data", ctx.palette.muted));
            return doc;
        }

        let plot = Rect::new(
            body.x + Y_AXIS_WIDTH,
            body.y + 8.0,
            (body.width - Y_AXIS_WIDTH).max(0.0),
            (body.height - X_AXIS_HEIGHT - 8.0).max(0.0),
        );
        let x = LinearScale::new(
            (0.0, (self.len() - 1) as f64),
            (plot.x as f64, plot.right() as f64),
        );
        let y = LinearScale::new(self.value_domain(), (plot.bottom() as f64, plot.y as f64))
            .nice(TICKS);
        let at = |i: usize, v: f64| Point::new(x.map(i as f64) as f32, y.map(v) as f32);

        doc.push(self.render_axes(ctx, plot, &x, &y));

        let color = ctx.palette.series_color(0);
        let last = self.history.len() - 1;
        let anchor = at(last, self.history[last]);

        // "Now" divider between history and forecast
        doc.push(
            svg::line(Point::new(anchor.x, plot.y), Point::new(anchor.x, plot.bottom()))
                .stroke(ctx.palette.muted, 1.0)
                .attr("stroke-dasharray", "4 4")
                .class("now"),
        );

        if self.show_band && !self.forecast.is_empty() {
            let offset = self.history.len();
            let upper: Vec<Point> = std::iter::once(anchor)
                .chain(self.forecast.iter().enumerate().map(|(i, p)| at(offset + i, p.upper)))
                .collect();
            let lower: Vec<Point> = std::iter::once(anchor)
                .chain(self.forecast.iter().enumerate().map(|(i, p)| at(offset + i, p.lower)))
                .collect();
            doc.push(
                svg::path(&curve::band_path(&upper, &lower))
                    .fill(color.with_alpha(0.18))
                    .class("band"),
            );
        }

        let history: Vec<Point> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, v)| at(i, *v))
            .collect();
        doc.push(
            svg::path(&curve::line_path(&history))
                .attr("fill", "none")
                .stroke(color, 2.5)
                .class("history"),
        );

        if !self.forecast.is_empty() {
            let projected: Vec<Point> = std::iter::once(anchor)
                .chain(
                    self.forecast
                        .iter()
                        .enumerate()
                        .map(|(i, p)| at(self.history.len() + i, p.mean)),
                )
                .collect();
            doc.push(
                svg::path(&curve::smooth_path(&projected))
                    .attr("fill", "none")
                    .stroke(color, 2.0)
                    .attr("stroke-dasharray", "6 4")
                    .class("forecast"),
            );
        }

        if let (Some(capacity), true) = (self.capacity, self.show_capacity) {
            doc.push(self.render_capacity(ctx, plot, &x, &y, capacity));
        }

        if let Some(index) = self.hovered.as_deref().and_then(|k| self.index_of(k)) {
            let point = at(index, self.value(index));
            doc.push(
                svg::group()
                    .class("readout")
                    .child(
                        svg::line(Point::new(point.x, plot.y), Point::new(point.x, plot.bottom()))
                            .stroke(ctx.palette.accent, 1.0),
                    )
                    .child(svg::circle(point, 4.0).fill(ctx.palette.accent))
                    .child(ctx.label(
                        Point::new(plot.x + 6.0, plot.y + ctx.font_size),
                        &self.readout(index),
                        ctx.palette.foreground,
                    )),
            );
        }
        doc
    }
}
