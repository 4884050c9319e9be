// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Source file list with per-image progress and navigation.

use crate::models::progress::{Outcome, ProgressRecord};
use std::path::PathBuf;

/// Result of file panel interaction.
pub enum FileListAction {
    None,
    Select(usize),
    Previous,
    Next,
    Save,
    Skip,
}

/// Display the file panel.
pub fn show(
    ui: &mut egui::Ui,
    files: &[PathBuf],
    current: Option<usize>,
    progress: &ProgressRecord,
) -> FileListAction {
    let mut action = FileListAction::None;

    ui.heading("Files");
    ui.label(format!(
        "{} images · {} saved · {} skipped",
        files.len(),
        progress.saved_count(),
        progress.skipped_count()
    ));
    ui.separator();

    let list_height = (ui.available_height() - 90.0).max(100.0);
    egui::ScrollArea::vertical()
        .max_height(list_height)
        .show(ui, |ui| {
            for (index, path) in files.iter().enumerate() {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let label = match progress.status(path) {
                    None => name,
                    Some(Outcome::Skipped) => format!("– {} (skipped)", name),
                    Some(Outcome::SavedAs(saved)) => format!("✔ {} → {}", name, saved),
                };
                if ui.selectable_label(current == Some(index), label).clicked() {
                    action = FileListAction::Select(index);
                }
            }
        });

    ui.separator();
    let has_current = current.is_some();
    ui.horizontal(|ui| {
        if ui.add_enabled(has_current, egui::Button::new("< Prev")).clicked() {
            action = FileListAction::Previous;
        }
        if ui.add_enabled(has_current, egui::Button::new("Next >")).clicked() {
            action = FileListAction::Next;
        }
        if ui.add_enabled(has_current, egui::Button::new("Skip")).clicked() {
            action = FileListAction::Skip;
        }
    });

    let save = egui::Button::new(
        egui::RichText::new("Save (Ctrl+S)")
            .strong()
            .color(egui::Color32::WHITE),
    )
    .fill(egui::Color32::from_rgb(0x4C, 0xAF, 0x50));
    if ui.add_enabled(has_current, save).clicked() {
        action = FileListAction::Save;
    }

    action
}
