// ABOUTME: Points, rectangles and split directions in canvas pixel space.
// ABOUTME: Rect splitting is the primitive the treemap slicer is built on.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Parts sit side by side (the width is divided)
    Horizontal,
    /// Parts are stacked (the height is divided)
    Vertical,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Unit square in normalized coordinates
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the right and bottom edges belong to the neighbor
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Shrink on all sides; collapses to a zero-size rect at the center
    /// instead of going negative
    pub fn inset(&self, amount: f32) -> Rect {
        let dx = amount.min(self.width / 2.0);
        let dy = amount.min(self.height / 2.0);
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    /// Take `length` px off the leading edge along `direction`.
    /// Returns (taken, rest).
    pub fn take(&self, direction: Direction, length: f32) -> (Rect, Rect) {
        match direction {
            Direction::Horizontal => {
                let w = length.max(0.0).min(self.width);
                (
                    Rect::new(self.x, self.y, w, self.height),
                    Rect::new(self.x + w, self.y, self.width - w, self.height),
                )
            }
            Direction::Vertical => {
                let h = length.max(0.0).min(self.height);
                (
                    Rect::new(self.x, self.y, self.width, h),
                    Rect::new(self.x, self.y + h, self.width, self.height - h),
                )
            }
        }
    }

    /// Split into two rects that exactly tile this one
    pub fn split(&self, direction: Direction, ratio: f32) -> (Rect, Rect) {
        let ratio = ratio.clamp(0.0, 1.0);
        match direction {
            Direction::Horizontal => self.take(direction, self.width * ratio),
            Direction::Vertical => self.take(direction, self.height * ratio),
        }
    }

    /// Extent along `direction`
    pub fn length(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }
}
