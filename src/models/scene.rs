// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The drawing scene.
//!
//! A scene holds the visible strokes of the active document on top of a
//! single background image. It is a passive container: recording history
//! for its mutations is the document's job, not the scene's.

use super::stroke::{Point, Stroke, StrokeId};
use crate::util::geometry::{distance_to_segment, Rect};
use image::DynamicImage;

/// The background layer: the source photo rendered beneath every stroke.
#[derive(Debug, Clone)]
pub struct Background {
    image: DynamicImage,
    opacity: f32,
    visible: bool,
}

impl Background {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Full image rectangle at native resolution.
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }
}

/// Circular erase region in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub center: Point,
    pub radius: f32,
}

impl HitRegion {
    pub fn new(center: Point, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Whether any painted segment of `stroke` passes through the region.
    pub fn touches(&self, stroke: &Stroke) -> bool {
        let reach = self.radius + stroke.pen().width / 2.0;
        stroke
            .segments()
            .any(|(a, b)| distance_to_segment(self.center, a, b) <= reach)
    }
}

fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Visible strokes plus the background layer.
///
/// Strokes are kept sorted by id, which is their creation order and
/// therefore their z-order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    strokes: Vec<Stroke>,
    background: Option<Background>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the id for a new stroke; it sorts above every existing one.
    pub fn allocate_id(&mut self) -> StrokeId {
        let id = StrokeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a stroke at its z-order position. A stroke already present is not duplicated.
    pub fn add_stroke(&mut self, stroke: Stroke) -> bool {
        let id = stroke.id();
        match self.strokes.binary_search_by_key(&id, Stroke::id) {
            Ok(_) => false,
            Err(index) => {
                self.next_id = self.next_id.max(id.0 + 1);
                self.strokes.insert(index, stroke);
                true
            }
        }
    }

    /// Remove every listed stroke that is present; others are ignored.
    /// Returns how many strokes were removed.
    pub fn remove_strokes<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = StrokeId>,
    {
        let before = self.strokes.len();
        for id in ids {
            if let Ok(index) = self.strokes.binary_search_by_key(&id, Stroke::id) {
                self.strokes.remove(index);
            }
        }
        before - self.strokes.len()
    }

    /// Append a point to a stroke in place (live drawing feedback).
    pub fn extend_stroke(&mut self, id: StrokeId, point: Point) -> bool {
        match self.strokes.binary_search_by_key(&id, Stroke::id) {
            Ok(index) => {
                self.strokes[index].push_point(point);
                true
            }
            Err(_) => false,
        }
    }

    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes
            .binary_search_by_key(&id, Stroke::id)
            .ok()
            .map(|index| &self.strokes[index])
    }

    /// Visible strokes, bottom to top.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    #[cfg(test)]
    pub fn stroke_ids(&self) -> Vec<StrokeId> {
        self.strokes.iter().map(Stroke::id).collect()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// All strokes whose painted path intersects `region`, bottom to top.
    pub fn hit_test(&self, region: &HitRegion) -> Vec<&Stroke> {
        self.strokes
            .iter()
            .filter(|stroke| region.touches(stroke))
            .collect()
    }

    /// Remove every stroke; the background is left alone.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Tight bounds of the painted strokes, or `None` when there are none.
    pub fn bounding_box_of_strokes(&self) -> Option<Rect> {
        self.strokes
            .iter()
            .filter_map(|stroke| {
                let mut points = stroke.points().iter();
                let first = Rect::from_point(*points.next()?);
                let bounds = points.fold(first, |acc, p| acc.union(&Rect::from_point(*p)));
                Some(bounds.inflate(stroke.pen().width / 2.0))
            })
            .reduce(|acc, rect| acc.union(&rect))
    }

    pub fn set_background(&mut self, image: DynamicImage, opacity: f32) {
        self.background = Some(Background {
            image,
            opacity: clamp_opacity(opacity),
            visible: true,
        });
    }

    pub fn clear_background(&mut self) {
        self.background = None;
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn set_background_opacity(&mut self, opacity: f32) {
        if let Some(background) = self.background.as_mut() {
            background.opacity = clamp_opacity(opacity);
        }
    }

    /// Show or hide the background layer; returns the previous visibility.
    pub fn set_background_visible(&mut self, visible: bool) -> bool {
        match self.background.as_mut() {
            Some(background) => std::mem::replace(&mut background.visible, visible),
            None => false,
        }
    }
}
