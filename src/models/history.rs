// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo history.
//!
//! Every user action on the scene is recorded as a reversible [`Command`].
//! The [`History`] keeps two stacks: commands currently applied and
//! commands that were undone and can be redone.

use super::scene::Scene;
use super::stroke::{Stroke, StrokeId};

/// A reversible scene mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A committed pen stroke.
    AddStroke(Stroke),
    /// Strokes removed by one erase pass. Never empty.
    RemoveStrokes(Vec<Stroke>),
}

impl Command {
    /// Build an erase command, or `None` when nothing was hit.
    pub fn remove_strokes(strokes: Vec<Stroke>) -> Option<Self> {
        if strokes.is_empty() {
            None
        } else {
            Some(Command::RemoveStrokes(strokes))
        }
    }

    /// Perform the command's forward effect.
    pub fn apply(&self, scene: &mut Scene) {
        match self {
            Command::AddStroke(stroke) => {
                scene.add_stroke(stroke.clone());
            }
            Command::RemoveStrokes(strokes) => {
                scene.remove_strokes(strokes.iter().map(Stroke::id));
            }
        }
    }

    /// Perform the command's backward effect.
    pub fn revert(&self, scene: &mut Scene) {
        match self {
            Command::AddStroke(stroke) => {
                scene.remove_strokes([stroke.id()]);
            }
            Command::RemoveStrokes(strokes) => {
                for stroke in strokes {
                    scene.add_stroke(stroke.clone());
                }
            }
        }
    }

    /// Ids of the strokes this command touches.
    pub fn stroke_ids(&self) -> Vec<StrokeId> {
        match self {
            Command::AddStroke(stroke) => vec![stroke.id()],
            Command::RemoveStrokes(strokes) => strokes.iter().map(Stroke::id).collect(),
        }
    }

    /// Human-readable description, used for logging and menu labels.
    pub fn description(&self) -> String {
        match self {
            Command::AddStroke(_) => "Draw stroke".to_string(),
            Command::RemoveStrokes(strokes) if strokes.len() == 1 => "Erase stroke".to_string(),
            Command::RemoveStrokes(strokes) => format!("Erase {} strokes", strokes.len()),
        }
    }
}

/// Undo/redo stacks. Depth is unbounded.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Commands whose effect is in the scene (most recent at the end)
    applied: Vec<Command>,
    /// Commands that were undone (most recent at the end)
    undone: Vec<Command>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command to the scene and record it. Clears the redo stack.
    pub fn push_and_apply(&mut self, command: Command, scene: &mut Scene) {
        command.apply(scene);
        self.record(command);
    }

    /// Record a command whose effect is already visible in the scene.
    pub fn record(&mut self, command: Command) {
        log::debug!("History: recorded '{}'", command.description());
        self.applied.push(command);
        self.undone.clear();
    }

    /// Reverse the most recent command. Returns it, or `None` if there was nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> Option<&Command> {
        let command = self.applied.pop()?;
        command.revert(scene);
        log::debug!("History: undo '{}'", command.description());
        self.undone.push(command);
        self.undone.last()
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, scene: &mut Scene) -> Option<&Command> {
        let command = self.undone.pop()?;
        command.apply(scene);
        log::debug!("History: redo '{}'", command.description());
        self.applied.push(command);
        self.applied.last()
    }

    /// Drop both stacks without touching the scene.
    pub fn clear(&mut self) {
        self.applied.clear();
        self.undone.clear();
        log::debug!("History cleared");
    }

    pub fn can_undo(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Number of applied commands.
    pub fn undo_depth(&self) -> usize {
        self.applied.len()
    }

    /// Number of undone commands available for redo.
    pub fn redo_depth(&self) -> usize {
        self.undone.len()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.applied.last().map(Command::description)
    }

    pub fn redo_description(&self) -> Option<String> {
        self.undone.last().map(Command::description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stroke::{Pen, Point};

    fn new_stroke(scene: &mut Scene, y: f32) -> Stroke {
        let id = scene.allocate_id();
        Stroke::from_points(
            id,
            Pen::default(),
            vec![Point::new(0.0, y), Point::new(50.0, y)],
        )
        .unwrap()
    }

    #[test]
    fn test_undo_all_restores_initial_scene() {
        let mut scene = Scene::new();
        let mut history = History::new();
        let seed = new_stroke(&mut scene, 0.0);
        scene.add_stroke(seed.clone());
        let initial = scene.strokes().to_vec();

        let a = new_stroke(&mut scene, 10.0);
        let b = new_stroke(&mut scene, 20.0);
        history.push_and_apply(Command::AddStroke(a.clone()), &mut scene);
        history.push_and_apply(Command::AddStroke(b), &mut scene);
        let erase = Command::remove_strokes(vec![seed, a]).unwrap();
        history.push_and_apply(erase, &mut scene);
        assert_eq!(scene.len(), 1);

        for _ in 0..3 {
            assert!(history.undo(&mut scene).is_some());
        }
        assert_eq!(scene.strokes(), initial.as_slice());
        assert!(!history.can_undo());
        assert_eq!(history.redo_depth(), 3);
    }

    #[test]
    fn test_undo_then_redo_matches_applied_state() {
        let mut scene = Scene::new();
        let mut history = History::new();
        let a = new_stroke(&mut scene, 10.0);
        history.push_and_apply(Command::AddStroke(a), &mut scene);
        let after_push = scene.strokes().to_vec();

        history.undo(&mut scene);
        assert!(scene.is_empty());
        history.redo(&mut scene);
        assert_eq!(scene.strokes(), after_push.as_slice());
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_push_after_undo_discards_redo() {
        let mut scene = Scene::new();
        let mut history = History::new();
        let a = new_stroke(&mut scene, 10.0);
        let b = new_stroke(&mut scene, 20.0);
        history.push_and_apply(Command::AddStroke(a), &mut scene);
        history.undo(&mut scene);
        assert!(history.can_redo());

        history.push_and_apply(Command::AddStroke(b.clone()), &mut scene);
        assert!(!history.can_redo());
        assert!(history.redo(&mut scene).is_none());
        assert_eq!(scene.stroke_ids(), vec![b.id()]);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut scene = Scene::new();
        let mut history = History::new();
        assert!(history.undo(&mut scene).is_none());
        assert!(history.redo(&mut scene).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_clear_does_not_touch_scene() {
        let mut scene = Scene::new();
        let mut history = History::new();
        let a = new_stroke(&mut scene, 10.0);
        history.push_and_apply(Command::AddStroke(a), &mut scene);
        history.clear();
        assert_eq!(scene.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commands_tolerate_replay() {
        let mut scene = Scene::new();
        let a = new_stroke(&mut scene, 10.0);
        let add = Command::AddStroke(a);
        add.apply(&mut scene);
        add.apply(&mut scene);
        assert_eq!(scene.len(), 1);
        add.revert(&mut scene);
        add.revert(&mut scene);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_empty_erase_builds_no_command() {
        assert!(Command::remove_strokes(Vec::new()).is_none());
    }

    #[test]
    fn test_descriptions() {
        let mut scene = Scene::new();
        let a = new_stroke(&mut scene, 10.0);
        let b = new_stroke(&mut scene, 20.0);
        assert_eq!(Command::AddStroke(a.clone()).description(), "Draw stroke");
        assert_eq!(
            Command::remove_strokes(vec![a.clone()]).unwrap().description(),
            "Erase stroke"
        );
        assert_eq!(
            Command::remove_strokes(vec![a, b]).unwrap().description(),
            "Erase 2 strokes"
        );
    }
}
