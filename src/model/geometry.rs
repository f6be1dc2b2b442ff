//! Core geometry types in image-pixel space.
//!
//! Origin is the top-left pixel, coordinates are 0-based offsets.

use serde::{Deserialize, Serialize};

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp into `[0, width] x [0, height]`.
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self::new(self.x.clamp(0.0, width), self.y.clamp(0.0, height))
    }
}

/// An axis-aligned bounding box given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Create a normalized box from two arbitrary corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Tight envelope of a point set, `None` when the set is empty.
    pub fn envelope(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut env = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            env.xmin = env.xmin.min(p.x);
            env.ymin = env.ymin.min(p.y);
            env.xmax = env.xmax.max(p.x);
            env.ymax = env.ymax.max(p.y);
        }
        Some(env)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Area of the box; zero for degenerate or inverted boxes.
    pub fn area(&self) -> f64 {
        if self.xmax <= self.xmin || self.ymax <= self.ymin {
            return 0.0;
        }
        (self.xmax - self.xmin) * (self.ymax - self.ymin)
    }

    /// Check if a point is inside the box (edges included).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.xmin && point.x <= self.xmax && point.y >= self.ymin && point.y <= self.ymax
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.xmin, self.ymin)
    }

    /// Grow the box by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Self {
        Self::new(
            self.xmin - margin,
            self.ymin - margin,
            self.xmax + margin,
            self.ymax + margin,
        )
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundBox) -> Self {
        Self::new(
            self.xmin.min(other.xmin),
            self.ymin.min(other.ymin),
            self.xmax.max(other.xmax),
            self.ymax.max(other.ymax),
        )
    }

    /// Intersect with the image rectangle `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f64, height: f64) -> Self {
        Self::new(
            self.xmin.clamp(0.0, width),
            self.ymin.clamp(0.0, height),
            self.xmax.clamp(0.0, width),
            self.ymax.clamp(0.0, height),
        )
    }
}

/// Signed-area (shoelace) magnitude of a polygon.
///
/// Computes `0.5 * |sum x_i * (y_{i+1} - y_{i-1})|` with wraparound indices.
/// Self-intersecting input is not rejected.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let sum: f64 = (0..n)
        .map(|i| {
            let next = &points[(i + 1) % n];
            let prev = &points[(i + n - 1) % n];
            points[i].x * (next.y - prev.y)
        })
        .sum();
    0.5 * sum.abs()
}

/// Point-in-polygon test using ray casting.
pub fn polygon_contains(points: &[Point], point: &Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let vi = &points[i];
        let vj = &points[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
