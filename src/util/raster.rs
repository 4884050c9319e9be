// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stroke-layer rasterisation with tiny-skia.
//!
//! Produces the target half of a dataset pair: strokes painted
//! anti-aliased onto a fully transparent canvas.

use crate::models::stroke::Stroke;
use crate::util::geometry::Rect;
use image::RgbaImage;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

fn build_stroke_path(stroke: &Stroke) -> Option<tiny_skia::Path> {
    let (first, rest) = stroke.points().split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for point in rest {
        pb.line_to(point.x, point.y);
    }
    pb.finish()
}

/// Paint `strokes` (bottom to top) into an image covering `rect`.
///
/// Pixels outside every stroke stay fully transparent. Returns `None` when
/// the canvas cannot be allocated.
pub fn render_strokes(strokes: &[Stroke], rect: &Rect) -> Option<RgbaImage> {
    let (width, height) = rect.pixel_size();
    let mut pixmap = Pixmap::new(width, height)?;
    let transform = Transform::from_translate(-rect.min_x, -rect.min_y);

    for stroke in strokes {
        let pen = stroke.pen();
        let mut paint = Paint::default();
        paint.set_color_rgba8(pen.color.r, pen.color.g, pen.color.b, 255);
        paint.anti_alias = true;

        let moved = stroke
            .points()
            .windows(2)
            .any(|w| w[0] != w[1]);

        if moved {
            let Some(path) = build_stroke_path(stroke) else {
                continue;
            };
            let style = tiny_skia::Stroke {
                width: pen.width,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &style, transform, None);
        } else {
            // Zero-length path: paint the round pen tip as a dot
            let Some(tip) = stroke.points().first() else {
                continue;
            };
            if let Some(dot) = PathBuilder::from_circle(tip.x, tip.y, pen.width / 2.0) {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
            }
        }
    }

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let c = pixel.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stroke::{Pen, PenColor, Point, StrokeId};

    fn horizontal(id: u64, y: f32, color: PenColor) -> Stroke {
        Stroke::from_points(
            StrokeId(id),
            Pen::new(color, 4.0),
            vec![Point::new(10.0, y), Point::new(40.0, y)],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_layer_is_transparent() {
        let image = render_strokes(&[], &Rect::from_size(8, 6)).unwrap();
        assert_eq!(image.dimensions(), (8, 6));
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_stroke_is_painted_relative_to_rect() {
        let stroke = horizontal(0, 20.0, PenColor::new(255, 0, 0));
        let rect = Rect::new(8.0, 18.0, 42.0, 22.0);
        let image = render_strokes(&[stroke], &rect).unwrap();
        assert_eq!(image.dimensions(), (34, 4));

        // Middle of the line, translated by the rect origin
        let center = image.get_pixel(17, 2);
        assert_eq!(center.0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_later_strokes_paint_on_top() {
        let below = horizontal(0, 10.0, PenColor::new(255, 0, 0));
        let above = horizontal(1, 10.0, PenColor::new(0, 0, 255));
        let image = render_strokes(&[below, above], &Rect::from_size(50, 20)).unwrap();
        assert_eq!(image.get_pixel(25, 10).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_single_point_stroke_paints_a_dot() {
        let dot = Stroke::new(StrokeId(0), Pen::new(PenColor::BLACK, 6.0), Point::new(5.0, 5.0));
        let image = render_strokes(&[dot], &Rect::from_size(10, 10)).unwrap();
        assert_eq!(image.get_pixel(5, 5).0[3], 255);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
    }
}
