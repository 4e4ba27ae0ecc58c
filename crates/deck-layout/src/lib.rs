// ABOUTME: Layout math for chartdeck charts.
// ABOUTME: Slice-and-dice treemap with zoom focus, plus scales, polar and curve helpers.

pub mod curve;
mod focus;
mod geometry;
pub mod polar;
pub mod scale;
mod tree;
mod treemap;

pub use focus::{Breadcrumb, FocusState};
pub use geometry::{Direction, Point, Rect};
pub use scale::{BandScale, LinearScale};
pub use tree::{NodeId, TreeError, TreemapTree, WeightedNode};
pub use treemap::{compute_layout, Layout, LayoutOptions, LayoutRect};
