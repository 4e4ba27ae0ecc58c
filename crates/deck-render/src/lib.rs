// ABOUTME: SVG rendering for chartdeck.
// ABOUTME: Each chart owns its sample data and view state and renders a standalone SVG document.

pub mod alerts;
pub mod bullet;
pub mod bump;
pub mod chart;
pub mod forecast;
pub mod radar;
pub mod svg;
pub mod treemap;

pub use chart::{Chart, ChartKind, Interaction, InteractionError, RenderContext};
pub use svg::{Document, Element};
