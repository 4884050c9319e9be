// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stroke data structures.
//!
//! A stroke is one continuous freehand pen gesture: an ordered polyline in
//! background-image pixel coordinates plus the pen it was drawn with.

use serde::{Deserialize, Serialize};

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Opaque RGB pen color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PenColor {
    pub const BLACK: PenColor = PenColor { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl Default for PenColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Pen snapshot: color and width in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub color: PenColor,
    pub width: f32,
}

impl Pen {
    pub const MIN_WIDTH: f32 = 1.0;
    pub const MAX_WIDTH: f32 = 100.0;

    /// Create a pen, clamping the width into the supported range.
    pub fn new(color: PenColor, width: f32) -> Self {
        let width = if width.is_finite() {
            width.clamp(Self::MIN_WIDTH, Self::MAX_WIDTH)
        } else {
            Self::MIN_WIDTH
        };
        Self { color, width }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(PenColor::BLACK, 3.0)
    }
}

/// Identity of a stroke within one scene.
///
/// Ids are handed out in creation order, so they double as the z-order:
/// a larger id is painted on top of a smaller one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrokeId(pub u64);

/// A freehand annotation stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: StrokeId,
    pen: Pen,
    points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke anchored at `start`.
    pub fn new(id: StrokeId, pen: Pen, start: Point) -> Self {
        Self {
            id,
            pen,
            points: vec![start],
        }
    }

    /// Build a stroke from a full point list. Returns `None` for an empty list.
    #[cfg(test)]
    pub fn from_points(id: StrokeId, pen: Pen, points: Vec<Point>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { id, pen, points })
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn pen(&self) -> Pen {
        self.pen
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Extend the path. Only the scene calls this, for the live stroke.
    pub(crate) fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Segments of the path; a single-point stroke yields one degenerate segment.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let single = (self.points.len() == 1).then(|| (self.points[0], self.points[0]));
        single
            .into_iter()
            .chain(self.points.windows(2).map(|w| (w[0], w[1])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_width_is_clamped() {
        assert_eq!(Pen::new(PenColor::BLACK, 0.0).width, Pen::MIN_WIDTH);
        assert_eq!(Pen::new(PenColor::BLACK, 500.0).width, Pen::MAX_WIDTH);
        assert_eq!(Pen::new(PenColor::BLACK, f32::NAN).width, Pen::MIN_WIDTH);
        assert_eq!(Pen::new(PenColor::BLACK, 7.5).width, 7.5);
    }

    #[test]
    fn test_segments() {
        let mut stroke = Stroke::new(StrokeId(0), Pen::default(), Point::new(1.0, 1.0));
        let single: Vec<_> = stroke.segments().collect();
        assert_eq!(single, vec![(Point::new(1.0, 1.0), Point::new(1.0, 1.0))]);

        stroke.push_point(Point::new(2.0, 2.0));
        stroke.push_point(Point::new(3.0, 1.0));
        let segments: Vec<_> = stroke.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], (Point::new(2.0, 2.0), Point::new(3.0, 1.0)));
    }

    #[test]
    fn test_from_points_rejects_empty() {
        assert!(Stroke::from_points(StrokeId(0), Pen::default(), Vec::new()).is_none());
    }
}
