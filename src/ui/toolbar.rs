// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tool panel.
//!
//! Pen/eraser selection, pen settings, photo opacity, target size and the
//! history buttons.

use crate::document::{Tool, ToolSettings};
use crate::io::export::TargetExtent;
use crate::models::stroke::{Pen, PenColor};

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    SelectTool(Tool),
    SetPen(Pen),
    SetOpacity(f32),
    SetTargetExtent(TargetExtent),
    Undo,
    Redo,
    Clear,
}

/// Display the tool panel.
pub fn show(
    ui: &mut egui::Ui,
    settings: &ToolSettings,
    can_undo: bool,
    can_redo: bool,
    can_clear: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.heading("Tools");
    ui.separator();

    if ui
        .selectable_label(settings.tool == Tool::Pen, "✏ Pen (B)")
        .clicked()
    {
        action = ToolbarAction::SelectTool(Tool::Pen);
    }
    if ui
        .selectable_label(settings.tool == Tool::Eraser, "⌫ Eraser (E)")
        .clicked()
    {
        action = ToolbarAction::SelectTool(Tool::Eraser);
    }

    ui.separator();

    // Pen settings
    let mut color = settings.pen.color.to_array();
    ui.horizontal(|ui| {
        ui.label("Color");
        if ui.color_edit_button_srgb(&mut color).changed() {
            action = ToolbarAction::SetPen(Pen::new(
                PenColor::from_array(color),
                settings.pen.width,
            ));
        }
    });

    let mut width = settings.pen.width;
    if ui
        .add(egui::Slider::new(&mut width, Pen::MIN_WIDTH..=Pen::MAX_WIDTH).text("Width"))
        .changed()
    {
        action = ToolbarAction::SetPen(Pen::new(settings.pen.color, width));
    }

    let mut opacity = settings.background_opacity;
    if ui
        .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Photo opacity"))
        .changed()
    {
        action = ToolbarAction::SetOpacity(opacity);
    }

    let mut extent = settings.target_extent;
    egui::ComboBox::from_label("Target size")
        .selected_text(match extent {
            TargetExtent::StrokeBounds => "Stroke bounds",
            TargetExtent::Background => "Full image",
        })
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut extent, TargetExtent::StrokeBounds, "Stroke bounds");
            ui.selectable_value(&mut extent, TargetExtent::Background, "Full image");
        });
    if extent != settings.target_extent {
        action = ToolbarAction::SetTargetExtent(extent);
    }

    ui.separator();

    ui.horizontal(|ui| {
        if ui.add_enabled(can_undo, egui::Button::new("⟲ Undo")).clicked() {
            action = ToolbarAction::Undo;
        }
        if ui.add_enabled(can_redo, egui::Button::new("⟳ Redo")).clicked() {
            action = ToolbarAction::Redo;
        }
    });
    if ui
        .add_enabled(can_clear, egui::Button::new("Clear strokes"))
        .clicked()
    {
        action = ToolbarAction::Clear;
    }

    ui.add_space(8.0);
    let hint = match settings.tool {
        Tool::Pen => "Drag to draw a stroke",
        Tool::Eraser => "Drag over strokes to erase them",
    };
    ui.label(egui::RichText::new(hint).italics().weak());

    action
}
