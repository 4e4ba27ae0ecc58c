// ABOUTME: Alert dashboard: severity summary tiles over a sortable, filterable alert table.
// ABOUTME: Clicking a row opens its detail panel; clicking a tile filters by that severity.

use std::cmp::Ordering;
use std::fmt;

use deck_core::{format, Color, Palette};
use deck_layout::{Direction, Point, Rect};

use crate::chart::{
    apply_hover, toggle_selection, Chart, ChartKind, Interaction, InteractionError, RenderContext,
};
use crate::svg::{self, Document, Element};

const TILE_HEIGHT: f32 = 56.0;
const TILE_GAP: f32 = 12.0;
const HEADER_ROW: f32 = 24.0;
const ROW_HEIGHT: f32 = 28.0;
const DETAIL_HEIGHT: f32 = 48.0;

/// Column offsets from the left of the table
const COL_TITLE: f32 = 22.0;
const COL_SERVICE: f32 = 0.52;
const COL_STATUS: f32 = 0.72;
const COL_AGE: f32 = 0.88;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn all() -> &'static [Severity] {
        &[Severity::Critical, Severity::Warning, Severity::Info]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    pub fn from_name(name: &str) -> Option<Severity> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    pub fn color(&self, palette: &Palette) -> Color {
        match self {
            Severity::Critical => palette.critical,
            Severity::Warning => palette.warning,
            Severity::Info => palette.info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertStatus {
    Firing,
    Acknowledged,
    Resolved,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertStatus::Firing => "Firing",
            AlertStatus::Acknowledged => "Acknowledged",
            AlertStatus::Resolved => "Resolved",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub service: String,
    pub severity: Severity,
    pub status: AlertStatus,
    /// Seconds since the alert opened
    pub age_secs: u64,
    pub detail: String,
}

impl Alert {
    pub fn new(
        id: &str,
        title: &str,
        service: &str,
        severity: Severity,
        status: AlertStatus,
        age_secs: u64,
        detail: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            service: service.to_string(),
            severity,
            status,
            age_secs,
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSort {
    /// Most severe first, then unresolved, then newest
    Severity,
    /// Newest first
    Age,
    Service,
}

impl AlertSort {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "severity" => Some(AlertSort::Severity),
            "age" => Some(AlertSort::Age),
            "service" => Some(AlertSort::Service),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlertSort::Severity => "severity",
            AlertSort::Age => "age",
            AlertSort::Service => "service",
        }
    }

    fn compare(&self, a: &Alert, b: &Alert) -> Ordering {
        let by_severity = a
            .severity
            .cmp(&b.severity)
            .then(a.status.cmp(&b.status))
            .then(a.age_secs.cmp(&b.age_secs));
        match self {
            AlertSort::Severity => by_severity,
            AlertSort::Age => a.age_secs.cmp(&b.age_secs),
            AlertSort::Service => a.service.cmp(&b.service).then(by_severity),
        }
    }
}

pub struct AlertDashboard {
    title: String,
    alerts: Vec<Alert>,
    filter: Option<Severity>,
    sort: AlertSort,
    expanded: Option<String>,
    hovered: Option<String>,
}

impl AlertDashboard {
    pub fn new(title: &str, alerts: Vec<Alert>) -> Self {
        Self {
            title: title.to_string(),
            alerts,
            filter: None,
            sort: AlertSort::Severity,
            expanded: None,
            hovered: None,
        }
    }

    /// A morning's worth of production alerts
    pub fn sample() -> Self {
        use AlertStatus::*;
        use Severity::*;
        Self::new(
            "Production Alerts",
            vec![
                Alert::new(
                    "ALR-101",
                    "API p99 latency above 2s",
                    "checkout-api",
                    Critical,
                    Firing,
                    420,
                    "p99 latency 2.8s over the last 10 minutes; error budget burning at 14x.",
                ),
                Alert::new(
                    "ALR-102",
                    "Disk usage 92% on db-primary",
                    "postgres",
                    Critical,
                    Acknowledged,
                    3_900,
                    "Data volume at 92% and growing 1.5% per hour.",
                ),
                Alert::new(
                    "ALR-103",
                    "Consumer lag growing",
                    "orders-stream",
                    Warning,
                    Firing,
                    1_260,
                    "Lag at 48k messages on partition 3 and rising.",
                ),
                Alert::new(
                    "ALR-104",
                    "Certificate expires in 9 days",
                    "edge-proxy",
                    Warning,
                    Acknowledged,
                    190_800,
                    "Wildcard certificate renewal job last failed 2 days ago.",
                ),
                Alert::new(
                    "ALR-105",
                    "Pod restarts above threshold",
                    "search",
                    Warning,
                    Resolved,
                    7_200,
                    "search-7f9c restarted 6 times in 30 minutes (OOMKilled).",
                ),
                Alert::new(
                    "ALR-106",
                    "Nightly backup overran its window",
                    "backup",
                    Info,
                    Firing,
                    30_600,
                    "Backup finished 45 minutes after the maintenance window closed.",
                ),
                Alert::new(
                    "ALR-107",
                    "Deploy of checkout-api 2.41.0",
                    "checkout-api",
                    Info,
                    Resolved,
                    540,
                    "Rolled out to 100% of pods with no errors.",
                ),
                Alert::new(
                    "ALR-108",
                    "Error rate 4% on payments",
                    "payments",
                    Critical,
                    Firing,
                    95,
                    "5xx responses from the card processor gateway.",
                ),
            ],
        )
    }

    pub fn filter(&self) -> Option<Severity> {
        self.filter
    }

    pub fn sort(&self) -> AlertSort {
        self.sort
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Unresolved alerts of one severity
    pub fn active_count(&self, severity: Severity) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.severity == severity && a.status != AlertStatus::Resolved)
            .count()
    }

    /// Alerts passing the filter, in display order
    pub fn visible(&self) -> Vec<&Alert> {
        let mut rows: Vec<&Alert> = self
            .alerts
            .iter()
            .filter(|a| self.filter.map_or(true, |s| a.severity == s))
            .collect();
        rows.sort_by(|a, b| self.sort.compare(a, b));
        rows
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.visible().into_iter().map(|a| a.id.as_str()).collect()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    fn set_filter(&mut self, filter: Option<Severity>) -> bool {
        let mut changed = self.filter != filter;
        self.filter = filter;
        tracing::debug!("Alert filter: {:?}", self.filter);

        // The open panel and hover go away with their row
        let visible = self.visible_ids();
        let expanded_hidden = self
            .expanded
            .as_deref()
            .is_some_and(|id| !visible.contains(&id));
        let hover_hidden = self
            .hovered
            .as_deref()
            .is_some_and(|id| !visible.contains(&id));
        if expanded_hidden {
            self.expanded = None;
            changed = true;
        }
        if hover_hidden {
            self.hovered = None;
            changed = true;
        }
        changed
    }

    fn render_tiles(&self, ctx: &RenderContext, area: Rect) -> Element {
        let mut tiles = svg::group().class("summary");
        let count = Severity::all().len() as f32;
        let width = ((area.width - TILE_GAP * (count - 1.0)) / count).max(0.0);

        for (i, severity) in Severity::all().iter().enumerate() {
            let x = area.x + i as f32 * (width + TILE_GAP);
            let color = severity.color(&ctx.palette);
            let mut tile = svg::rect(Rect::new(x, area.y, width, TILE_HEIGHT))
                .fill(color.with_alpha(0.12))
                .attr("rx", 6);
            if self.filter == Some(*severity) {
                tile = tile.stroke(color, 2.0);
            }
            tiles.push(
                svg::group()
                    .key(severity.name())
                    .class("tile")
                    .child(tile)
                    .child(
                        ctx.label(
                            Point::new(x + 12.0, area.y + 30.0),
                            &self.active_count(*severity).to_string(),
                            color,
                        )
                        .num("font-size", ctx.font_size * 2.0)
                        .attr("font-weight", "700"),
                    )
                    .child(ctx.small_label(
                        Point::new(x + 12.0, area.y + 48.0),
                        &format!("{} active", severity.label()),
                    )),
            );
        }
        tiles
    }

    fn column(&self, table: Rect, fraction: f32) -> f32 {
        table.x + table.width * fraction
    }

    fn render_header(&self, ctx: &RenderContext, table: Rect, y: f32) -> Element {
        let mut header = svg::group().class("table-header");
        let columns = [
            (table.x + COL_TITLE, "Alert", Some(AlertSort::Severity)),
            (self.column(table, COL_SERVICE), "Service", Some(AlertSort::Service)),
            (self.column(table, COL_STATUS), "Status", None),
            (self.column(table, COL_AGE), "Age", Some(AlertSort::Age)),
        ];
        for (x, label, sort) in columns {
            let mut text = ctx.small_label(Point::new(x, y + 16.0), label);
            if sort == Some(self.sort) {
                text = text.fill(ctx.palette.foreground).attr("font-weight", "600");
            }
            header.push(text);
        }
        header.push(
            svg::line(
                Point::new(table.x, y + HEADER_ROW - 1.0),
                Point::new(table.right(), y + HEADER_ROW - 1.0),
            )
            .stroke(ctx.palette.grid, 1.0),
        );
        header
    }

    fn render_row(&self, ctx: &RenderContext, alert: &Alert, table: Rect, y: f32) -> Element {
        let color = alert.severity.color(&ctx.palette);
        let baseline = y + ROW_HEIGHT * 0.62;
        let open = self.expanded.as_deref() == Some(alert.id.as_str());
        let hovered = self.hovered.as_deref() == Some(alert.id.as_str());

        let background = if open || hovered {
            ctx.palette.grid.with_alpha(0.6)
        } else {
            ctx.palette.background
        };
        let title_width = self.column(table, COL_SERVICE) - (table.x + COL_TITLE) - 8.0;
        let title = format::fit_label(&alert.title, title_width, ctx.font_size).unwrap_or_default();

        let mut row = svg::group()
            .key(&alert.id)
            .class("alert-row")
            .child(svg::rect(Rect::new(table.x, y, table.width, ROW_HEIGHT)).fill(background))
            .child(svg::circle(Point::new(table.x + 8.0, y + ROW_HEIGHT / 2.0), 5.0).fill(color))
            .child(ctx.label(
                Point::new(table.x + COL_TITLE, baseline),
                &title,
                ctx.palette.foreground,
            ))
            .child(ctx.label(
                Point::new(self.column(table, COL_SERVICE), baseline),
                &alert.service,
                ctx.palette.muted,
            ))
            .child(ctx.label(
                Point::new(self.column(table, COL_STATUS), baseline),
                &alert.status.to_string(),
                if alert.status == AlertStatus::Firing {
                    color
                } else {
                    ctx.palette.muted
                },
            ))
            .child(ctx.label(
                Point::new(self.column(table, COL_AGE), baseline),
                &format::duration(alert.age_secs),
                ctx.palette.muted,
            ))
            .child(svg::title(&format!("{} {}", alert.id, alert.title)));
        if alert.status == AlertStatus::Resolved {
            row = row.opacity(0.55);
        }
        row
    }

    fn render_detail(&self, ctx: &RenderContext, alert: &Alert, table: Rect, y: f32) -> Element {
        let color = alert.severity.color(&ctx.palette);
        svg::group()
            .class("alert-detail")
            .child(
                svg::rect(Rect::new(table.x, y, table.width, DETAIL_HEIGHT - 4.0))
                    .fill(color.with_alpha(0.08)),
            )
            .child(svg::rect(Rect::new(table.x, y, 3.0, DETAIL_HEIGHT - 4.0)).fill(color))
            .child(ctx.label(
                Point::new(table.x + COL_TITLE, y + 18.0),
                &alert.detail,
                ctx.palette.foreground,
            ))
            .child(ctx.small_label(
                Point::new(table.x + COL_TITLE, y + 36.0),
                &format!(
                    "{} | {} | {} | open for {}",
                    alert.id,
                    alert.severity.label(),
                    alert.status,
                    format::duration(alert.age_secs)
                ),
            ))
    }
}

impl Chart for AlertDashboard {
    fn kind(&self) -> ChartKind {
        ChartKind::Alerts
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn handle(&mut self, interaction: &Interaction) -> Result<bool, InteractionError> {
        match interaction {
            Interaction::Hover(key) => {
                let known = key
                    .as_deref()
                    .is_some_and(|k| self.visible_ids().contains(&k));
                Ok(apply_hover(&mut self.hovered, key.as_deref(), known))
            }
            Interaction::Click(key) => {
                if let Some(severity) = Severity::from_name(key) {
                    let next = if self.filter == Some(severity) {
                        None
                    } else {
                        Some(severity)
                    };
                    return Ok(self.set_filter(next));
                }
                if !self.visible_ids().contains(&key.as_str()) {
                    return Err(InteractionError::UnknownTarget {
                        chart: self.kind().name(),
                        key: key.clone(),
                    });
                }
                toggle_selection(&mut self.expanded, key);
                Ok(true)
            }
            Interaction::Filter(None) => Ok(self.set_filter(None)),
            Interaction::Filter(Some(value)) => {
                let severity =
                    Severity::from_name(value).ok_or_else(|| InteractionError::UnknownFilter {
                        chart: self.kind().name(),
                        value: value.clone(),
                    })?;
                Ok(self.set_filter(Some(severity)))
            }
            Interaction::Sort(key) => {
                let sort = AlertSort::from_key(key).ok_or_else(|| InteractionError::UnknownSort {
                    chart: self.kind().name(),
                    key: key.clone(),
                })?;
                let changed = self.sort != sort;
                self.sort = sort;
                Ok(changed)
            }
            Interaction::Reset => {
                let changed = self.filter.is_some()
                    || self.sort != AlertSort::Severity
                    || self.expanded.is_some()
                    || self.hovered.is_some();
                self.filter = None;
                self.sort = AlertSort::Severity;
                self.expanded = None;
                self.hovered = None;
                Ok(changed)
            }
            Interaction::Back | Interaction::Breadcrumb(_) | Interaction::Toggle(_) => {
                Err(InteractionError::unsupported(self.kind(), interaction))
            }
        }
    }

    fn render(&self, ctx: &RenderContext) -> Document {
        let mut doc = ctx.document(&self.title);
        let body = ctx.body();

        let (tiles, table) = body.take(Direction::Vertical, TILE_HEIGHT + TILE_GAP);
        doc.push(self.render_tiles(ctx, tiles));

        let rows = self.visible();
        let status = format!(
            "{} of {} alerts, by {}",
            rows.len(),
            self.alerts.len(),
            self.sort.name()
        );
        doc.push(
            ctx.small_label(Point::new(body.right(), 24.0), &status)
                .attr("text-anchor", "end"),
        );

        doc.push(self.render_header(ctx, table, table.y));
        let mut y = table.y + HEADER_ROW;

        if rows.is_empty() {
            doc.push(ctx.label(
                Point::new(table.x + COL_TITLE, y + ROW_HEIGHT * 0.62),
                "No alerts match",
                ctx.palette.muted,
            ));
            return doc;
        }

        let mut list = svg::group().class("alert-list");
        for alert in rows {
            list.push(self.render_row(ctx, alert, table, y));
            y += ROW_HEIGHT;
            if self.expanded.as_deref() == Some(alert.id.as_str()) {
                list.push(self.render_detail(ctx, alert, table, y));
                y += DETAIL_HEIGHT;
            }
        }
        doc.push(list);
        doc
    }
}
