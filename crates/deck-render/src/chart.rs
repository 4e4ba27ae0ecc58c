// ABOUTME: Chart trait, user interactions and the render context shared by all charts.
// ABOUTME: Also the registry mapping chart names to their sample-backed implementations.

use std::fmt;

use deck_core::{Color, Config, Palette, TreemapSettings};
use deck_layout::{Point, Rect};

use crate::svg::{self, Document, Element};
use crate::{alerts, bullet, bump, forecast, radar, treemap};

/// Height reserved at the top of every chart for its title
pub const HEADER_HEIGHT: f32 = 36.0;

/// Outer margin around chart content
pub const MARGIN: f32 = 16.0;

/// A user gesture, addressed by the `data-key` of the element it hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Pointer over an element, or left the chart
    Hover(Option<String>),
    Click(String),
    /// Zoom out one level
    Back,
    /// Jump to a breadcrumb (0 = root)
    Breadcrumb(usize),
    /// Set or clear the active filter
    Filter(Option<String>),
    Sort(String),
    /// Flip a named on/off option (legend entry, overlay)
    Toggle(String),
    /// Back to the initial view state
    Reset,
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interaction::Hover(Some(k)) => write!(f, "hover:{}", k),
            Interaction::Hover(None) => write!(f, "unhover"),
            Interaction::Click(k) => write!(f, "click:{}", k),
            Interaction::Back => write!(f, "back"),
            Interaction::Breadcrumb(i) => write!(f, "crumb:{}", i),
            Interaction::Filter(Some(v)) => write!(f, "filter:{}", v),
            Interaction::Filter(None) => write!(f, "filter"),
            Interaction::Sort(k) => write!(f, "sort:{}", k),
            Interaction::Toggle(k) => write!(f, "toggle:{}", k),
            Interaction::Reset => write!(f, "reset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("{chart} has no element '{key}'")]
    UnknownTarget { chart: &'static str, key: String },

    #[error("{chart} has no filter '{value}'")]
    UnknownFilter { chart: &'static str, value: String },

    #[error("{chart} cannot sort by '{key}'")]
    UnknownSort { chart: &'static str, key: String },

    #[error("{chart} does not support '{interaction}'")]
    Unsupported {
        chart: &'static str,
        interaction: String,
    },
}

impl InteractionError {
    pub fn unsupported(kind: ChartKind, interaction: &Interaction) -> Self {
        InteractionError::Unsupported {
            chart: kind.name(),
            interaction: interaction.to_string(),
        }
    }
}

/// Everything a chart needs to know about the canvas it draws on
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: f32,
    pub height: f32,
    pub font_family: String,
    pub font_size: f32,
    pub palette: Palette,
    pub treemap: TreemapSettings,
}

impl RenderContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.width as f32,
            height: config.height as f32,
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            palette: config.palette.palette(),
            treemap: config.treemap.clone(),
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Area below the header, inside the margins
    pub fn body(&self) -> Rect {
        Rect::new(
            MARGIN,
            HEADER_HEIGHT,
            (self.width - 2.0 * MARGIN).max(0.0),
            (self.height - HEADER_HEIGHT - MARGIN).max(0.0),
        )
    }

    /// Empty document with background, default font and the chart title
    pub fn document(&self, title: &str) -> Document {
        let mut doc = Document::new(self.width, self.height);
        doc.root.set_attr("font-family", &self.font_family);
        doc.root.set_attr("font-size", svg::num(self.font_size));
        doc.push(
            svg::rect(Rect::new(0.0, 0.0, self.width, self.height))
                .fill(self.palette.background)
                .class("background"),
        );
        doc.push(
            self.label(Point::new(MARGIN, 24.0), title, self.palette.foreground)
                .num("font-size", self.font_size * 1.3)
                .attr("font-weight", "600")
                .class("title"),
        );
        doc
    }

    pub fn label(&self, at: Point, content: &str, color: Color) -> Element {
        svg::text(at, content).fill(color)
    }

    pub fn small_label(&self, at: Point, content: &str) -> Element {
        svg::text(at, content)
            .fill(self.palette.muted)
            .num("font-size", self.font_size * 0.85)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// An interactive chart: owns data plus local view state
pub trait Chart {
    fn kind(&self) -> ChartKind;

    fn title(&self) -> &str;

    /// Apply a gesture. Returns true when view state changed.
    fn handle(&mut self, interaction: &Interaction) -> Result<bool, InteractionError>;

    fn render(&self, ctx: &RenderContext) -> Document;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Treemap,
    Bullet,
    Radar,
    Bump,
    Forecast,
    Alerts,
}

impl ChartKind {
    pub fn all() -> &'static [ChartKind] {
        &[
            ChartKind::Treemap,
            ChartKind::Bullet,
            ChartKind::Radar,
            ChartKind::Bump,
            ChartKind::Forecast,
            ChartKind::Alerts,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Treemap => "treemap",
            ChartKind::Bullet => "bullet",
            ChartKind::Radar => "radar",
            ChartKind::Bump => "bump",
            ChartKind::Forecast => "forecast",
            ChartKind::Alerts => "alerts",
        }
    }

    pub fn from_name(name: &str) -> Option<ChartKind> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// The chart with its built-in dataset
    pub fn sample(&self) -> Box<dyn Chart> {
        match self {
            ChartKind::Treemap => Box::new(treemap::TreemapChart::sample()),
            ChartKind::Bullet => Box::new(bullet::BulletChart::sample()),
            ChartKind::Radar => Box::new(radar::RadarChart::sample()),
            ChartKind::Bump => Box::new(bump::BumpChart::sample()),
            ChartKind::Forecast => Box::new(forecast::ForecastChart::sample()),
            ChartKind::Alerts => Box::new(alerts::AlertDashboard::sample()),
        }
    }
}

/// Toggle helper for selection-style state: selecting the current value clears it
pub(crate) fn toggle_selection(slot: &mut Option<String>, key: &str) {
    if slot.as_deref() == Some(key) {
        *slot = None;
    } else {
        *slot = Some(key.to_string());
    }
}

/// Hover on anything other than a known key clears hover
pub(crate) fn apply_hover(slot: &mut Option<String>, key: Option<&str>, known: bool) -> bool {
    let next = match key {
        Some(k) if known => Some(k.to_string()),
        _ => None,
    };
    let changed = *slot != next;
    *slot = next;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_by_name() {
        for kind in ChartKind::all() {
            assert_eq!(ChartKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(ChartKind::from_name("TREEMAP"), Some(ChartKind::Treemap));
        assert_eq!(ChartKind::from_name("pie"), None);
    }

    #[test]
    fn every_sample_renders_with_title() {
        let ctx = RenderContext::default();
        for kind in ChartKind::all() {
            let chart = kind.sample();
            assert_eq!(chart.kind(), *kind);
            let doc = chart.render(&ctx);
            let svg = doc.to_string();
            assert!(svg.starts_with("<svg"), "{} did not render", kind.name());
            assert!(svg.contains(chart.title()));
        }
    }

    #[test]
    fn interaction_display_matches_action_syntax() {
        assert_eq!(Interaction::Click("a/b".into()).to_string(), "click:a/b");
        assert_eq!(Interaction::Filter(None).to_string(), "filter");
        assert_eq!(Interaction::Breadcrumb(2).to_string(), "crumb:2");
    }

    #[test]
    fn hover_helper_clears_on_unknown() {
        let mut slot = Some("a".to_string());
        assert!(!apply_hover(&mut slot, Some("a"), true));
        assert!(apply_hover(&mut slot, Some("zzz"), false));
        assert_eq!(slot, None);
    }

    #[test]
    fn body_sits_below_header() {
        let ctx = RenderContext::default().with_size(400.0, 300.0);
        let body = ctx.body();
        assert_eq!(body.y, HEADER_HEIGHT);
        assert_eq!(body.width, 400.0 - 2.0 * MARGIN);
    }
}
