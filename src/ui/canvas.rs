// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas.
//!
//! Shows the background photo with the strokes on top and turns pointer
//! input into gesture actions in image coordinates.

use crate::document::{Document, Tool};
use crate::models::stroke::{Point, Stroke};
use crate::util::geometry::ViewTransform;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Begin(Point),
    Extend(Point),
    End,
}

/// Display the canvas and translate pointer input.
pub fn show(
    ui: &mut egui::Ui,
    document: &Document,
    texture: &Option<egui::TextureHandle>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(background)) = (texture, document.scene().background()) else {
            show_welcome(ui);
            return;
        };

        let area = ui.max_rect();
        let view = ViewTransform::fit(
            background.width(),
            background.height(),
            area.min.x,
            area.min.y,
            area.width(),
            area.height(),
        );
        let image_rect = egui::Rect::from_min_size(
            egui::pos2(view.offset_x, view.offset_y),
            egui::vec2(
                background.width() as f32 * view.scale,
                background.height() as f32 * view.scale,
            ),
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::drag());
        let painter = ui.painter_at(area);

        if background.is_visible() {
            let alpha = (background.opacity() * 255.0).round() as u8;
            painter.image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::from_white_alpha(alpha),
            );
        }

        for stroke in document.scene().strokes() {
            draw_stroke(&painter, stroke, &view);
        }

        let (pressed, down, released, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });

        if document.is_gesture_active() {
            if released || !down {
                action = CanvasAction::End;
            } else if let Some(pos) = pointer {
                action = CanvasAction::Extend(view.to_image(pos.x, pos.y));
            }
        } else if pressed && response.hovered() {
            if let Some(pos) = pointer {
                action = CanvasAction::Begin(view.to_image(pos.x, pos.y));
            }
        }

        // Eraser outline follows the pointer
        if document.settings().tool == Tool::Eraser {
            if let Some(pos) = response.hover_pos() {
                painter.circle_stroke(
                    pos,
                    document.settings().pen.width / 2.0 * view.scale,
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 80, 80)),
                );
            }
        }
    });

    action
}

/// Draw a stroke in screen space.
fn draw_stroke(painter: &egui::Painter, stroke: &Stroke, view: &ViewTransform) {
    let pen = stroke.pen();
    let color = egui::Color32::from_rgb(pen.color.r, pen.color.g, pen.color.b);
    let width = pen.width * view.scale;

    let screen_points: Vec<egui::Pos2> = stroke
        .points()
        .iter()
        .map(|p| {
            let (x, y) = view.to_screen(p);
            egui::pos2(x, y)
        })
        .collect();

    match screen_points.as_slice() {
        [] => {}
        [single] => {
            painter.circle_filled(*single, width / 2.0, color);
        }
        _ => {
            painter.add(egui::Shape::line(
                screen_points.clone(),
                egui::Stroke::new(width, color),
            ));
            // Round joins and caps
            for point in &screen_points {
                painter.circle_filled(*point, width / 2.0, color);
            }
        }
    }
}

/// Shown before any image is loaded.
fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("LinePair")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Line-art dataset pair builder")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a folder of images to begin drawing")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Folder... (Ctrl+O)")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
