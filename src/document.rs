// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The active document: scene, history and pointer-gesture routing.
//!
//! `Document` is the single owner of the scene and its history. The UI
//! feeds it pointer gestures and commands; it turns them into scene
//! mutations wrapped in undoable commands and queues [`DocumentEvent`]s
//! for the UI to drain.

use crate::io::export::{self, ExportError, ExportedPair, TargetExtent};
use crate::models::history::{Command, History};
use crate::models::scene::{HitRegion, Scene};
use crate::models::stroke::{Pen, Point, Stroke, StrokeId};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// Tool state shared by every gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub tool: Tool,
    /// Pen for new strokes; its width also sizes the eraser
    pub pen: Pen,
    pub background_opacity: f32,
    pub target_extent: TargetExtent,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            pen: Pen::default(),
            background_opacity: 1.0,
            target_extent: TargetExtent::default(),
        }
    }
}

/// Notifications for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    DocumentLoaded { width: u32, height: u32 },
    DocumentCleared,
    DocumentClosed,
    StrokeAdded(StrokeId),
    StrokesRemoved(Vec<StrokeId>),
    HistoryChanged { can_undo: bool, can_redo: bool },
    ExportSucceeded(u64),
    ExportFailed(String),
}

/// Pointer gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    /// Live stroke, visible in the scene but not yet in history
    Drawing(StrokeId),
    Erasing,
}

/// Scene, history and gesture state of the image being annotated.
#[derive(Debug)]
pub struct Document {
    scene: Scene,
    history: History,
    gesture: Gesture,
    settings: ToolSettings,
    source_path: Option<PathBuf>,
    events: Vec<DocumentEvent>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(ToolSettings::default())
    }
}

impl Document {
    /// Create an empty document (no background loaded).
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            scene: Scene::new(),
            history: History::new(),
            gesture: Gesture::Idle,
            settings,
            source_path: None,
            events: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Source image the document was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.scene.background().is_some()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit_history(&mut self) {
        self.events.push(DocumentEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    // ------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------

    /// Replace the document with a new background image.
    ///
    /// History is cleared first, then the scene is replaced; a gesture
    /// still in flight is dropped so none of its strokes reach the new
    /// document's history.
    pub fn load_document(&mut self, image: DynamicImage, source_path: Option<PathBuf>) {
        self.gesture = Gesture::Idle;
        self.history.clear();

        let (width, height) = (image.width(), image.height());
        let mut scene = Scene::new();
        scene.set_background(image, self.settings.background_opacity);
        self.scene = scene;
        self.source_path = source_path;

        log::info!(
            "Loaded document {} ({}x{})",
            self.source_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string()),
            width,
            height
        );
        self.events.push(DocumentEvent::DocumentLoaded { width, height });
        self.emit_history();
    }

    /// Unload the document entirely: strokes, history and background.
    pub fn close(&mut self) {
        self.cancel_gesture();
        self.history.clear();
        self.scene.clear();
        self.scene.clear_background();
        self.source_path = None;
        log::info!("Closed document");
        self.events.push(DocumentEvent::DocumentClosed);
        self.emit_history();
    }

    /// Remove every stroke and forget the history. The background stays.
    pub fn clear_document(&mut self) {
        self.cancel_gesture();
        self.scene.clear();
        self.history.clear();
        log::info!("Cleared document");
        self.events.push(DocumentEvent::DocumentCleared);
        self.emit_history();
    }

    // ------------------------------------------------------------------
    // Tool settings
    // ------------------------------------------------------------------

    /// Switch tools. Ignored while a gesture is in progress.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if self.is_gesture_active() {
            log::debug!("Ignoring tool switch during a gesture");
            return false;
        }
        self.settings.tool = tool;
        true
    }

    /// Pen for subsequent strokes; strokes already drawn keep their pen.
    pub fn set_pen(&mut self, pen: Pen) {
        self.settings.pen = Pen::new(pen.color, pen.width);
    }

    pub fn set_background_opacity(&mut self, opacity: f32) {
        if !opacity.is_finite() {
            return;
        }
        self.settings.background_opacity = opacity.clamp(0.0, 1.0);
        self.scene.set_background_opacity(self.settings.background_opacity);
    }

    pub fn set_target_extent(&mut self, extent: TargetExtent) {
        self.settings.target_extent = extent;
    }

    // ------------------------------------------------------------------
    // Pointer gestures
    // ------------------------------------------------------------------

    /// Pointer pressed. Starts a live stroke or an erase gesture.
    pub fn begin_gesture(&mut self, point: Point) -> bool {
        if self.is_gesture_active() || !self.is_loaded() {
            return false;
        }
        match self.settings.tool {
            Tool::Pen => {
                let id = self.scene.allocate_id();
                self.scene
                    .add_stroke(Stroke::new(id, self.settings.pen, point));
                self.gesture = Gesture::Drawing(id);
            }
            Tool::Eraser => {
                self.gesture = Gesture::Erasing;
                self.erase_at(point);
            }
        }
        true
    }

    /// Pointer moved while pressed.
    pub fn extend_gesture(&mut self, point: Point) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing(id) => {
                let repeated = self
                    .scene
                    .stroke(id)
                    .and_then(|stroke| stroke.points().last())
                    .is_some_and(|last| *last == point);
                if !repeated {
                    self.scene.extend_stroke(id, point);
                }
            }
            Gesture::Erasing => self.erase_at(point),
        }
    }

    /// Pointer released. Commits a drawn stroke of two or more points.
    pub fn end_gesture(&mut self) {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let Gesture::Drawing(id) = gesture else {
            return;
        };
        let Some(stroke) = self.scene.stroke(id).cloned() else {
            return;
        };

        if stroke.point_count() < 2 {
            self.scene.remove_strokes([id]);
            log::debug!("Discarded single-point stroke");
            return;
        }

        log::info!("Committed stroke with {} points", stroke.point_count());
        // The live preview already applied the forward effect
        self.history.record(Command::AddStroke(stroke));
        self.events.push(DocumentEvent::StrokeAdded(id));
        self.emit_history();
    }

    /// Abandon the current gesture, removing a live stroke without history.
    pub fn cancel_gesture(&mut self) {
        if let Gesture::Drawing(id) = std::mem::replace(&mut self.gesture, Gesture::Idle) {
            self.scene.remove_strokes([id]);
            log::debug!("Cancelled stroke in progress");
        }
    }

    /// One erase pass: remove every stroke under the eraser as one command.
    fn erase_at(&mut self, point: Point) {
        let region = HitRegion::new(point, self.settings.pen.width / 2.0);
        let hits: Vec<Stroke> = self
            .scene
            .hit_test(&region)
            .into_iter()
            .cloned()
            .collect();
        let Some(command) = Command::remove_strokes(hits) else {
            return;
        };

        let ids = command.stroke_ids();
        log::info!("Erased {} stroke(s)", ids.len());
        self.history.push_and_apply(command, &mut self.scene);
        self.events.push(DocumentEvent::StrokesRemoved(ids));
        self.emit_history();
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Undo the last command. Ignored while a gesture is in progress.
    pub fn undo(&mut self) -> bool {
        if self.is_gesture_active() {
            return false;
        }
        let Some(command) = self.history.undo(&mut self.scene) else {
            return false;
        };
        let events: Vec<DocumentEvent> = match command {
            Command::AddStroke(stroke) => vec![DocumentEvent::StrokesRemoved(vec![stroke.id()])],
            Command::RemoveStrokes(strokes) => strokes
                .iter()
                .map(|stroke| DocumentEvent::StrokeAdded(stroke.id()))
                .collect(),
        };
        log::info!("Undo");
        self.events.extend(events);
        self.emit_history();
        true
    }

    /// Redo the last undone command. Ignored while a gesture is in progress.
    pub fn redo(&mut self) -> bool {
        if self.is_gesture_active() {
            return false;
        }
        let Some(command) = self.history.redo(&mut self.scene) else {
            return false;
        };
        let event = match command {
            Command::AddStroke(stroke) => DocumentEvent::StrokeAdded(stroke.id()),
            Command::RemoveStrokes(_) => DocumentEvent::StrokesRemoved(command.stroke_ids()),
        };
        log::info!("Redo");
        self.events.push(event);
        self.emit_history();
        true
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Export the document as the next dataset pair under `root`.
    ///
    /// A stroke still being drawn is committed first.
    pub fn export_current(&mut self, root: &Path) -> Result<ExportedPair, ExportError> {
        self.end_gesture();
        match export::export_pair(&mut self.scene, root, self.settings.target_extent) {
            Ok(pair) => {
                self.events.push(DocumentEvent::ExportSucceeded(pair.index));
                Ok(pair)
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.events.push(DocumentEvent::ExportFailed(e.to_string()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stroke::PenColor;
    use image::GenericImageView;
    use tempfile::TempDir;

    fn loaded(width: u32, height: u32) -> Document {
        let mut doc = Document::default();
        doc.load_document(DynamicImage::new_rgb8(width, height), None);
        doc.drain_events();
        doc
    }

    fn draw(doc: &mut Document, points: &[(f32, f32)]) {
        let (first, rest) = points.split_first().unwrap();
        assert!(doc.begin_gesture(Point::new(first.0, first.1)));
        for (x, y) in rest {
            doc.extend_gesture(Point::new(*x, *y));
        }
        doc.end_gesture();
    }

    fn erase(doc: &mut Document, x: f32, y: f32) {
        doc.set_tool(Tool::Eraser);
        doc.begin_gesture(Point::new(x, y));
        doc.end_gesture();
        doc.set_tool(Tool::Pen);
    }

    #[test]
    fn test_stroke_is_live_before_commit() {
        let mut doc = loaded(100, 100);
        doc.begin_gesture(Point::new(1.0, 1.0));
        doc.extend_gesture(Point::new(5.0, 5.0));
        assert_eq!(doc.scene().len(), 1);
        assert!(!doc.history().can_undo());

        doc.end_gesture();
        assert_eq!(doc.history().undo_depth(), 1);
        assert_eq!(doc.scene().strokes()[0].point_count(), 2);
    }

    #[test]
    fn test_single_click_leaves_no_trace() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(5.0, 5.0)]);
        // A move that does not change position adds no point
        draw(&mut doc, &[(7.0, 7.0), (7.0, 7.0)]);
        assert!(doc.scene().is_empty());
        assert!(!doc.history().can_undo());
        assert!(doc.drain_events().is_empty());
    }

    #[test]
    fn test_erase_miss_is_a_noop() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        doc.drain_events();

        erase(&mut doc, 50.0, 50.0);
        assert_eq!(doc.scene().len(), 1);
        assert_eq!(doc.history().undo_depth(), 1);
        assert!(doc.drain_events().is_empty());
    }

    #[test]
    fn test_one_erase_pass_is_one_command() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(0.0, 50.0), (100.0, 50.0)]);
        draw(&mut doc, &[(0.0, 52.0), (100.0, 52.0)]);
        draw(&mut doc, &[(0.0, 90.0), (100.0, 90.0)]);
        doc.set_pen(Pen::new(PenColor::BLACK, 10.0));

        erase(&mut doc, 50.0, 51.0);
        assert_eq!(doc.scene().len(), 1);
        assert_eq!(doc.history().undo_depth(), 4);
        assert_eq!(doc.history().undo_description().as_deref(), Some("Erase 2 strokes"));

        assert!(doc.undo());
        assert_eq!(doc.scene().len(), 3);
    }

    #[test]
    fn test_erase_drag_pushes_one_command_per_sample() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(10.0, 0.0), (10.0, 100.0)]);
        draw(&mut doc, &[(50.0, 0.0), (50.0, 100.0)]);
        doc.set_tool(Tool::Eraser);
        doc.begin_gesture(Point::new(10.0, 50.0));
        doc.extend_gesture(Point::new(30.0, 50.0));
        doc.extend_gesture(Point::new(50.0, 50.0));
        doc.end_gesture();

        assert!(doc.scene().is_empty());
        assert_eq!(doc.history().undo_depth(), 4);
    }

    #[test]
    fn test_tool_switch_ignored_mid_gesture() {
        let mut doc = loaded(100, 100);
        doc.begin_gesture(Point::new(1.0, 1.0));
        assert!(!doc.set_tool(Tool::Eraser));
        assert_eq!(doc.settings().tool, Tool::Pen);
        assert!(!doc.undo());
        doc.end_gesture();
        assert!(doc.set_tool(Tool::Eraser));
    }

    #[test]
    fn test_gesture_needs_a_document() {
        let mut doc = Document::default();
        assert!(!doc.begin_gesture(Point::new(1.0, 1.0)));
        assert!(doc.scene().is_empty());
    }

    #[test]
    fn test_switching_documents_drops_live_stroke_and_history() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(0.0, 0.0), (10.0, 10.0)]);
        doc.begin_gesture(Point::new(20.0, 20.0));
        doc.extend_gesture(Point::new(30.0, 30.0));

        doc.load_document(DynamicImage::new_rgb8(10, 10), Some(PathBuf::from("b.png")));
        // Release arriving after the switch must not commit anything
        doc.end_gesture();

        assert!(doc.scene().is_empty());
        assert!(!doc.history().can_undo());
        assert!(!doc.history().can_redo());
        assert_eq!(doc.source_path(), Some(Path::new("b.png")));
    }

    #[test]
    fn test_close_unloads_document() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(0.0, 0.0), (10.0, 10.0)]);
        assert!(doc.begin_gesture(Point::new(5.0, 5.0)));
        doc.drain_events();

        doc.close();
        assert_eq!(
            doc.drain_events(),
            vec![
                DocumentEvent::DocumentClosed,
                DocumentEvent::HistoryChanged {
                    can_undo: false,
                    can_redo: false
                },
            ]
        );
        assert!(!doc.is_loaded());
        assert!(!doc.is_gesture_active());
        assert!(doc.scene().is_empty());
        assert!(!doc.history().can_undo());
        assert_eq!(doc.source_path(), None);
        assert!(!doc.begin_gesture(Point::new(5.0, 5.0)));

        let root = TempDir::new().unwrap();
        assert!(matches!(
            doc.export_current(root.path()),
            Err(ExportError::NoBackground)
        ));
    }

    #[test]
    fn test_clear_document() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(0.0, 0.0), (10.0, 10.0)]);
        doc.undo();
        draw(&mut doc, &[(0.0, 5.0), (10.0, 5.0)]);
        doc.clear_document();

        assert!(doc.scene().is_empty());
        assert!(doc.is_loaded());
        assert!(!doc.history().can_undo());
        assert!(!doc.undo());
    }

    #[test]
    fn test_history_events() {
        let mut doc = loaded(100, 100);
        draw(&mut doc, &[(0.0, 0.0), (10.0, 10.0)]);
        let events = doc.drain_events();
        let id = doc.scene().strokes()[0].id();
        assert_eq!(
            events,
            vec![
                DocumentEvent::StrokeAdded(id),
                DocumentEvent::HistoryChanged { can_undo: true, can_redo: false },
            ]
        );

        doc.undo();
        assert_eq!(
            doc.drain_events(),
            vec![
                DocumentEvent::StrokesRemoved(vec![id]),
                DocumentEvent::HistoryChanged { can_undo: false, can_redo: true },
            ]
        );
    }

    #[test]
    fn test_draw_erase_undo_export_chain() {
        let root = TempDir::new().unwrap();
        let mut doc = loaded(800, 600);

        draw(&mut doc, &[(10.0, 10.0), (100.0, 100.0)]);
        let stroke = doc.scene().strokes()[0].clone();

        doc.set_pen(Pen::new(PenColor::BLACK, 10.0));
        erase(&mut doc, 50.0, 50.0);
        assert!(doc.scene().is_empty());
        assert_eq!(doc.history().undo_depth(), 2);
        assert_eq!(doc.history().undo_description().as_deref(), Some("Erase stroke"));

        // Undo the erase: the stroke is back
        assert!(doc.undo());
        assert_eq!(doc.scene().strokes(), &[stroke]);

        // Undo the draw: nothing left to export but the background
        assert!(doc.undo());
        assert!(doc.scene().is_empty());
        assert_eq!(doc.history().undo_depth(), 0);
        assert_eq!(doc.history().redo_depth(), 2);
        doc.drain_events();

        let pair = doc.export_current(root.path()).unwrap();
        assert_eq!(pair.index, 0);
        assert_eq!(doc.drain_events(), vec![DocumentEvent::ExportSucceeded(0)]);

        let input = image::open(&pair.input_path).unwrap();
        assert_eq!(input.dimensions(), (800, 600));
        let target = image::open(&pair.target_path).unwrap().to_rgba8();
        assert_eq!(target.dimensions(), (800, 600));
        assert!(target.pixels().all(|p| p.0[3] == 0));

        // Export leaves history untouched; redo still works
        assert_eq!(doc.history().redo_depth(), 2);
        assert!(doc.redo());
        assert_eq!(doc.scene().len(), 1);
    }

    #[test]
    fn test_export_failure_is_reported() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let mut doc = loaded(10, 10);
        draw(&mut doc, &[(0.0, 0.0), (5.0, 5.0)]);
        doc.drain_events();

        assert!(doc.export_current(&blocker).is_err());
        let events = doc.drain_events();
        assert!(matches!(events.as_slice(), [DocumentEvent::ExportFailed(_)]));
        assert_eq!(doc.scene().len(), 1);
        assert_eq!(doc.history().undo_depth(), 1);
    }
}
