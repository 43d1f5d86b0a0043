//! Axis-aligned geometry primitives
//!
//! `Rect::overlaps` is the only definition of "overlap" in the crate: two
//! rectangles overlap when their open interiors share positive area, so
//! rectangles that merely share an edge or a corner do not. Comparisons
//! allow [`EPSILON`] of rounding slack, since edges built from `x + width`
//! rarely land on the exact same float twice.

use serde::{Deserialize, Serialize};

/// Slack used by every edge comparison
pub const EPSILON: f64 = 1e-9;

/// A point in layout space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Swap the two coordinates
    pub fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }
}

/// An axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "rect must have positive size");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from two opposite corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.left(), self.top(), self.right(), self.bottom())
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if the open interiors share positive area
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.left() + EPSILON
            || other.right() <= self.left() + EPSILON
            || self.bottom() <= other.top() + EPSILON
            || other.bottom() <= self.top() + EPSILON)
    }

    /// Check if the rectangles share a boundary segment of positive length
    /// without overlapping
    pub fn touches(&self, other: &Rect) -> bool {
        if self.overlaps(other) {
            return false;
        }
        let vertical_contact = (near(self.right(), other.left())
            || near(other.right(), self.left()))
            && span_overlap(self.top(), self.bottom(), other.top(), other.bottom()) > EPSILON;
        let horizontal_contact = (near(self.bottom(), other.top())
            || near(other.bottom(), self.top()))
            && span_overlap(self.left(), self.right(), other.left(), other.right()) > EPSILON;
        vertical_contact || horizontal_contact
    }

    /// Check if a point lies inside or on the boundary
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Check if another rectangle lies fully inside this one
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left() - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.top() >= self.top() - EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    /// Grow every side by `margin`
    pub fn expand_by(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Mirror across the x = y diagonal
    pub fn transposed(&self) -> Rect {
        Rect {
            x: self.y,
            y: self.x,
            width: self.height,
            height: self.width,
        }
    }
}

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Length of the intersection of [a0, a1] and [b0, b1] (0 when disjoint)
pub fn span_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}
