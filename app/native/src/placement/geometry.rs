//! Geometric primitives shared by every placement component.
//!
//! Coordinates use a top-left origin with `y` growing downwards, matching
//! what display servers report for window frames.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Point / Size
// ============================================================================

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: Self) -> f64 { (self.x - other.x).hypot(self.y - other.y) }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }

    /// Returns the area covered by this size.
    #[must_use]
    pub fn area(&self) -> f64 { self.width * self.height }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by origin point and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    /// X coordinate of the origin (top-left corner).
    pub x: f64,
    /// Y coordinate of the origin (top-left corner).
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle from origin point and size.
    #[must_use]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Returns the origin point of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Point { Point { x: self.x, y: self.y } }

    /// Returns the size of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Size { Size { width: self.width, height: self.height } }

    /// Right edge (exclusive).
    #[must_use]
    pub fn max_x(&self) -> f64 { self.x + self.width }

    /// Bottom edge (exclusive).
    #[must_use]
    pub fn max_y(&self) -> f64 { self.y + self.height }

    /// Returns the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Returns whether a point is inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.max_x()
            && point.y >= self.y
            && point.y <= self.max_y()
    }

    /// Returns the area of the rectangle.
    #[must_use]
    pub fn area(&self) -> f64 { self.width * self.height }

    /// Returns `true` when the rectangle has no positive area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool { self.width <= 0.0 || self.height <= 0.0 }

    /// Euclidean distance from `point` to the nearest point of this rectangle.
    ///
    /// Returns 0 when the point lies inside or exactly on the boundary.
    #[must_use]
    pub fn distance_to_point(&self, point: Point) -> f64 {
        let dx = (self.x - point.x).max(0.0).max(point.x - self.max_x());
        let dy = (self.y - point.y).max(0.0).max(point.y - self.max_y());
        dx.hypot(dy)
    }

    /// Resolves a rectangle expressed in percentages `[0, 100]` of `frame`.
    #[must_use]
    pub fn from_percent(percent: &Self, frame: &Self) -> Self {
        Self::new(
            frame.x + frame.width * percent.x / 100.0,
            frame.y + frame.height * percent.y / 100.0,
            frame.width * percent.width / 100.0,
            frame.height * percent.height / 100.0,
        )
    }

    /// Shrinks the rectangle by `amount` in total on each axis, keeping it centred.
    ///
    /// Width and height never drop below one pixel.
    #[must_use]
    pub fn shrink_centered(&self, amount: f64) -> Self {
        let width = (self.width - amount).max(1.0);
        let height = (self.height - amount).max(1.0);
        Self::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Returns a copy moved by the given offsets.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns `true` if the two rectangles overlap with positive area.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Returns `true` if every coordinate is within `epsilon` of `other`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

// ============================================================================
// Tests
// ============================================================================
