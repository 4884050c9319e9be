// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the active [`Document`], the persisted
//! [`Settings`] and the source folder listing, and routes UI input to
//! the document.

use crate::config::Settings;
use crate::document::{Document, DocumentEvent, Tool};
use crate::io::media::{self, LoadError};
use crate::ui::{canvas, file_list, toolbar};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

/// Result of a background image decode.
struct LoadedImage {
    index: usize,
    path: PathBuf,
    result: Result<DynamicImage, LoadError>,
}

/// Main application state.
pub struct LinePairApp {
    /// Active document: scene, history and gesture state
    document: Document,

    /// Persisted settings, including the progress record
    settings: Settings,

    /// Where settings are written; `None` disables persistence
    settings_path: Option<PathBuf>,

    /// Images of the open source folder
    files: Vec<PathBuf>,

    /// Index into `files` of the loaded document
    current: Option<usize>,

    /// Texture of the loaded background image
    image_texture: Option<egui::TextureHandle>,

    /// Receiver for background image loading
    image_loader: Option<Receiver<LoadedImage>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last status line message
    status: String,
}

impl LinePairApp {
    /// Create the application from loaded settings, reopening the last folder.
    pub fn new(settings: Settings, settings_path: Option<PathBuf>) -> Self {
        let mut app = Self {
            document: Document::new(settings.tool_settings()),
            settings,
            settings_path,
            files: Vec::new(),
            current: None,
            image_texture: None,
            image_loader: None,
            loading_message: None,
            status: "Ready".to_string(),
        };
        if let Some(folder) = app.settings.last_folder.clone() {
            if folder.is_dir() {
                app.open_folder(folder);
            }
        }
        app
    }

    /// Write settings (with the current tool preferences) to disk.
    fn persist_settings(&mut self) {
        self.settings.update_from(self.document.settings());
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save(path) {
                log::error!("Failed to save settings: {:#}", e);
            }
        }
    }

    /// List a source folder and load its first unprocessed image.
    fn open_folder(&mut self, folder: PathBuf) {
        let files = match media::list_images(&folder) {
            Ok(files) => files,
            Err(e) => {
                log::error!("{}", e);
                self.status = e.to_string();
                return;
            }
        };
        log::info!("Opened folder {} ({} images)", folder.display(), files.len());

        self.settings.progress.switch_folder(&folder);
        if !self.settings.progress.is_empty() {
            log::info!(
                "Resuming: {} of {} images already processed",
                self.settings.progress.len(),
                files.len()
            );
        }
        self.settings.last_folder = Some(folder);
        self.files = files;
        self.current = None;
        self.image_loader = None;
        self.loading_message = None;
        self.image_texture = None;
        self.document.close();
        self.persist_settings();

        let first = self
            .files
            .iter()
            .position(|path| self.settings.progress.status(path).is_none())
            .or_else(|| (!self.files.is_empty()).then_some(0));
        match first {
            Some(index) => self.load_file(index),
            None => self.status = "Folder contains no images".to_string(),
        }
    }

    /// Decode `files[index]` on a background thread.
    fn load_file(&mut self, index: usize) {
        let Some(path) = self.files.get(index).cloned() else {
            return;
        };
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some(format!("Loading {}...", path.display()));

        std::thread::spawn(move || {
            let result = media::load_image(&path);
            let _ = sender.send(LoadedImage {
                index,
                path,
                result,
            });
        });
    }

    /// Install a decoded image as the active document.
    fn finish_loading(&mut self, ctx: &egui::Context, loaded: LoadedImage) {
        match loaded.result {
            Ok(image) => {
                let rgba = image.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                self.image_texture = Some(ctx.load_texture(
                    "background",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
                self.document.load_document(image, Some(loaded.path));
                self.current = Some(loaded.index);
            }
            Err(e) => {
                // The previous document stays active
                log::error!("{}", e);
                self.status = e.to_string();
            }
        }
    }

    fn step(&mut self, forward: bool) {
        let Some(current) = self.current else {
            return;
        };
        let next = if forward {
            current + 1
        } else {
            current.wrapping_sub(1)
        };
        if next < self.files.len() {
            self.load_file(next);
        } else if forward {
            self.status = "Reached the last image".to_string();
        }
    }

    /// Whether the next image is still being decoded.
    fn is_loading(&self) -> bool {
        self.image_loader.is_some()
    }

    /// Export the current document and move on to the next image.
    fn save_current(&mut self) {
        if self.is_loading() {
            log::debug!("Ignoring save while an image is loading");
            return;
        }
        let Some(source) = self.document.source_path().map(PathBuf::from) else {
            return;
        };
        if self.settings.save_dir.is_none() {
            self.settings.save_dir = rfd::FileDialog::new().pick_folder();
        }
        let Some(save_dir) = self.settings.save_dir.clone() else {
            self.status = "No save directory selected".to_string();
            return;
        };

        if let Ok(pair) = self.document.export_current(&save_dir) {
            self.settings.progress.mark_saved(&source, pair.file_name());
            self.persist_settings();
            self.step(true);
        }
    }

    fn skip_current(&mut self) {
        if self.is_loading() {
            log::debug!("Ignoring skip while an image is loading");
            return;
        }
        if let Some(source) = self.document.source_path().map(PathBuf::from) {
            self.settings.progress.mark_skipped(&source);
            self.persist_settings();
            self.step(true);
        }
    }

    fn pick_folder(&mut self) {
        let mut dialog = rfd::FileDialog::new();
        if let Some(last) = &self.settings.last_folder {
            dialog = dialog.set_directory(last);
        }
        if let Some(folder) = dialog.pick_folder() {
            self.open_folder(folder);
        }
    }

    fn pick_save_dir(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            log::info!("Save directory set to {}", dir.display());
            self.settings.save_dir = Some(dir);
            self.persist_settings();
        }
    }

    /// Turn queued document events into status messages.
    fn handle_document_events(&mut self) {
        for event in self.document.drain_events() {
            match event {
                DocumentEvent::ExportSucceeded(index) => {
                    self.status = format!("Saved pair {}", crate::io::export::pair_file_name(index));
                }
                DocumentEvent::ExportFailed(reason) => {
                    self.status = format!("Save failed: {}", reason);
                }
                DocumentEvent::DocumentLoaded { width, height } => {
                    self.status = format!("Loaded {}x{}", width, height);
                }
                DocumentEvent::DocumentCleared => {
                    self.status = "Cleared all strokes".to_string();
                }
                DocumentEvent::DocumentClosed
                | DocumentEvent::StrokeAdded(_)
                | DocumentEvent::StrokesRemoved(_)
                | DocumentEvent::HistoryChanged { .. } => {}
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::O)) {
            self.pick_folder();
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save_current();
        }

        // Undo (Ctrl+Z)
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.document.undo();
        }

        // Redo (Ctrl+Shift+Z or Ctrl+Y)
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.document.redo();
        }

        if ctx.input(|i| !i.modifiers.command && i.key_pressed(egui::Key::B)) {
            self.document.set_tool(Tool::Pen);
        }
        if ctx.input(|i| !i.modifiers.command && i.key_pressed(egui::Key::E)) {
            self.document.set_tool(Tool::Eraser);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.step(false);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.step(true);
        }
    }
}

impl eframe::App for LinePairApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed image loading
        if let Some(ref receiver) = self.image_loader {
            if let Ok(loaded) = receiver.try_recv() {
                self.image_loader = None;
                self.loading_message = None;
                self.finish_loading(ctx, loaded);
            }
        }

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Folder... (Ctrl+O)").clicked() {
                        self.pick_folder();
                        ui.close_menu();
                    }
                    if ui.button("Set Save Directory...").clicked() {
                        self.pick_save_dir();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let undo_label = match self.document.history().undo_description() {
                        Some(what) => format!("Undo {} (Ctrl+Z)", what),
                        None => "Undo (Ctrl+Z)".to_string(),
                    };
                    if ui
                        .add_enabled(self.document.history().can_undo(), egui::Button::new(undo_label))
                        .clicked()
                    {
                        self.document.undo();
                        ui.close_menu();
                    }

                    let redo_label = match self.document.history().redo_description() {
                        Some(what) => format!("Redo {} (Ctrl+Shift+Z)", what),
                        None => "Redo (Ctrl+Shift+Z)".to_string(),
                    };
                    if ui
                        .add_enabled(self.document.history().can_redo(), egui::Button::new(redo_label))
                        .clicked()
                    {
                        self.document.redo();
                        ui.close_menu();
                    }

                    ui.separator();
                    if ui.button("Clear Strokes").clicked() {
                        self.document.clear_document();
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status.as_str());
                if self.document.is_loaded() {
                    let history = self.document.history();
                    ui.separator();
                    ui.label(format!(
                        "{} strokes · undo {} · redo {}",
                        self.document.scene().len(),
                        history.undo_depth(),
                        history.redo_depth()
                    ));
                }
                if let Some(dir) = &self.settings.save_dir {
                    ui.separator();
                    ui.label(format!("Saving to {}", dir.display()));
                }
            });
        });

        // Tool panel (left side)
        let toolbar_action = egui::SidePanel::left("tools")
            .default_width(200.0)
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    self.document.settings(),
                    self.document.history().can_undo(),
                    self.document.history().can_redo(),
                    !self.document.scene().is_empty(),
                )
            })
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::SelectTool(tool) => {
                self.document.set_tool(tool);
            }
            toolbar::ToolbarAction::SetPen(pen) => self.document.set_pen(pen),
            toolbar::ToolbarAction::SetOpacity(opacity) => {
                self.document.set_background_opacity(opacity)
            }
            toolbar::ToolbarAction::SetTargetExtent(extent) => {
                self.document.set_target_extent(extent);
                self.persist_settings();
            }
            toolbar::ToolbarAction::Undo => {
                self.document.undo();
            }
            toolbar::ToolbarAction::Redo => {
                self.document.redo();
            }
            toolbar::ToolbarAction::Clear => self.document.clear_document(),
            toolbar::ToolbarAction::None => {}
        }

        // File panel (right side)
        let file_action = egui::SidePanel::right("files")
            .default_width(250.0)
            .show(ctx, |ui| {
                file_list::show(ui, &self.files, self.current, &self.settings.progress)
            })
            .inner;

        match file_action {
            file_list::FileListAction::Select(index) => self.load_file(index),
            file_list::FileListAction::Previous => self.step(false),
            file_list::FileListAction::Next => self.step(true),
            file_list::FileListAction::Save => self.save_current(),
            file_list::FileListAction::Skip => self.skip_current(),
            file_list::FileListAction::None => {}
        }

        self.handle_shortcuts(ctx);

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    canvas::CanvasAction::None
                } else {
                    canvas::show(ui, &self.document, &self.image_texture)
                }
            })
            .inner;

        match canvas_action {
            canvas::CanvasAction::Begin(point) => {
                self.document.begin_gesture(point);
            }
            canvas::CanvasAction::Extend(point) => self.document.extend_gesture(point),
            canvas::CanvasAction::End => self.document.end_gesture(),
            canvas::CanvasAction::None => {}
        }

        self.handle_document_events();
    }
}

impl Drop for LinePairApp {
    fn drop(&mut self) {
        self.persist_settings();
    }
}
