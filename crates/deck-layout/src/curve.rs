// ABOUTME: SVG path data builders for line charts.
// ABOUTME: Straight polylines, Catmull-Rom smoothing, bump curves and filled bands.

use std::fmt::Write;

use crate::geometry::Point;

fn move_to(out: &mut String, p: Point) {
    let _ = write!(out, "M{:.1},{:.1}", p.x, p.y);
}

fn line_to(out: &mut String, p: Point) {
    let _ = write!(out, " L{:.1},{:.1}", p.x, p.y);
}

fn curve_to(out: &mut String, c1: Point, c2: Point, p: Point) {
    let _ = write!(
        out,
        " C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
        c1.x, c1.y, c2.x, c2.y, p.x, p.y
    );
}

/// `M x,y L x,y ...`
pub fn line_path(points: &[Point]) -> String {
    let mut out = String::new();
    let Some((first, rest)) = points.split_first() else {
        return out;
    };
    move_to(&mut out, *first);
    for p in rest {
        line_to(&mut out, *p);
    }
    out
}

/// Smooth curve through every point (uniform Catmull-Rom as cubic beziers).
/// End segments reuse the endpoint as their missing neighbor.
pub fn smooth_path(points: &[Point]) -> String {
    let mut out = String::new();
    let Some(first) = points.first() else {
        return out;
    };
    move_to(&mut out, *first);

    for i in 0..points.len().saturating_sub(1) {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];

        let c1 = Point::new(p1.x + (p2.x - p0.x) / 6.0, p1.y + (p2.y - p0.y) / 6.0);
        let c2 = Point::new(p2.x - (p3.x - p1.x) / 6.0, p2.y - (p3.y - p1.y) / 6.0);
        curve_to(&mut out, c1, c2, p2);
    }
    out
}

/// S-curves between consecutive points with both control points at the
/// horizontal midpoint, so every point is a flat turning point
pub fn bump_path(points: &[Point]) -> String {
    let mut out = String::new();
    let Some(first) = points.first() else {
        return out;
    };
    move_to(&mut out, *first);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let mid_x = (a.x + b.x) / 2.0;
        curve_to(&mut out, Point::new(mid_x, a.y), Point::new(mid_x, b.y), b);
    }
    out
}

/// Closed area between two polylines sharing x positions: along `upper`
/// left to right, back along `lower` right to left
pub fn band_path(upper: &[Point], lower: &[Point]) -> String {
    if upper.is_empty() || lower.is_empty() {
        return String::new();
    }
    let mut out = line_path(upper);
    for p in lower.iter().rev() {
        line_to(&mut out, *p);
    }
    out.push_str(" Z");
    out
}
