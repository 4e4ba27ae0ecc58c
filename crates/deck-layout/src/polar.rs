// ABOUTME: Polar geometry for radar charts.
// ABOUTME: Axis angles, value polygons and grid rings around a center point.

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::geometry::Point;

/// Angle of axis `index` out of `count`. Axis 0 points straight up and the
/// rest follow clockwise in screen space.
pub fn axis_angle(index: usize, count: usize) -> f32 {
    if count == 0 {
        return -FRAC_PI_2;
    }
    -FRAC_PI_2 + TAU * index as f32 / count as f32
}

pub fn polar_point(center: Point, radius: f32, angle: f32) -> Point {
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// One vertex per value, at `value / max` of the full radius.
/// Values are clamped to `0..=max`.
pub fn radar_points(values: &[f64], max: f64, center: Point, radius: f32) -> Vec<Point> {
    let count = values.len();
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let ratio = if max > 0.0 {
                (v / max).clamp(0.0, 1.0) as f32
            } else {
                0.0
            };
            polar_point(center, radius * ratio, axis_angle(i, count))
        })
        .collect()
}

/// Regular polygon through every axis at `radius`, for grid rings
pub fn ring_points(count: usize, center: Point, radius: f32) -> Vec<Point> {
    (0..count)
        .map(|i| polar_point(center, radius, axis_angle(i, count)))
        .collect()
}

/// `x,y x,y ...` as used by SVG `points`
pub fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn first_axis_points_up() {
        let p = polar_point(Point::new(100.0, 100.0), 50.0, axis_angle(0, 5));
        assert!(near(p, Point::new(100.0, 50.0)));
    }

    #[test]
    fn axes_go_clockwise() {
        let center = Point::new(0.0, 0.0);
        let ring = ring_points(4, center, 10.0);
        assert!(near(ring[0], Point::new(0.0, -10.0)));
        assert!(near(ring[1], Point::new(10.0, 0.0)));
        assert!(near(ring[2], Point::new(0.0, 10.0)));
        assert!(near(ring[3], Point::new(-10.0, 0.0)));
    }

    #[test]
    fn values_scale_and_clamp() {
        let center = Point::new(0.0, 0.0);
        let pts = radar_points(&[50.0, 200.0, -5.0, 100.0], 100.0, center, 10.0);
        assert!(near(pts[0], Point::new(0.0, -5.0)));
        assert!(near(pts[1], Point::new(10.0, 0.0)));
        assert!(near(pts[2], center));
        assert!(near(pts[3], Point::new(-10.0, 0.0)));
    }

    #[test]
    fn zero_max_collapses_to_center() {
        let center = Point::new(3.0, 4.0);
        let pts = radar_points(&[1.0, 2.0, 3.0], 0.0, center, 10.0);
        assert!(pts.iter().all(|p| near(*p, center)));
    }

    #[test]
    fn points_attr_format() {
        let attr = points_attr(&[Point::new(1.0, 2.0), Point::new(3.3, 4.0)]);
        assert_eq!(attr, "1.0,2.0 3.3,4.0");
    }
}
