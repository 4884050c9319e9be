// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Axis-aligned rectangles, point/segment distance for erase hit testing,
//! and the mapping between screen coordinates and image pixel coordinates.

use crate::models::stroke::Point;

/// An axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Rectangle covering an image of the given size at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn from_point(point: Point) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow by `amount` on every side.
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Integer-aligned hull: floor the minimum, ceil the maximum.
    pub fn snap_out(&self) -> Rect {
        Rect {
            min_x: self.min_x.floor(),
            min_y: self.min_y.floor(),
            max_x: self.max_x.ceil(),
            max_y: self.max_y.ceil(),
        }
    }

    /// Pixel dimensions of the rectangle, at least 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        let width = self.width().ceil().max(1.0) as u32;
        let height = self.height().ceil().max(1.0) as u32;
        (width, height)
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Placement of an image inside a screen area: uniform scale plus offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
}

impl ViewTransform {
    /// Fit an image into the available area, preserving aspect ratio and centering it.
    pub fn fit(
        image_width: u32,
        image_height: u32,
        area_x: f32,
        area_y: f32,
        area_width: f32,
        area_height: f32,
    ) -> Self {
        let scale_x = area_width / image_width.max(1) as f32;
        let scale_y = area_height / image_height.max(1) as f32;
        let scale = scale_x.min(scale_y).max(f32::EPSILON);
        let display_width = image_width as f32 * scale;
        let display_height = image_height as f32 * scale;
        Self {
            offset_x: area_x + (area_width - display_width) / 2.0,
            offset_y: area_y + (area_height - display_height) / 2.0,
            scale,
        }
    }

    /// Convert screen coordinates to image pixel coordinates.
    pub fn to_image(&self, screen_x: f32, screen_y: f32) -> Point {
        Point {
            x: (screen_x - self.offset_x) / self.scale,
            y: (screen_y - self.offset_y) / self.scale,
        }
    }

    /// Convert image pixel coordinates to screen coordinates.
    pub fn to_screen(&self, point: &Point) -> (f32, f32) {
        (
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }
}
