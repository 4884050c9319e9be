// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted application settings.
//!
//! Remembers the last source folder, the dataset save directory, pen and
//! display preferences, and the per-image progress record between runs.

use crate::document::{Tool, ToolSettings};
use crate::io::export::TargetExtent;
use crate::io::serialization;
use crate::models::progress::ProgressRecord;
use crate::models::stroke::Pen;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings file location.
pub const SETTINGS_ENV: &str = "LINEPAIR_SETTINGS";
const APP_DIR: &str = "linepair";
const SETTINGS_FILE: &str = "settings.json";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Source folder opened last
    pub last_folder: Option<PathBuf>,
    /// Dataset root receiving `input/` and `target/`
    pub save_dir: Option<PathBuf>,
    pub pen: Pen,
    pub background_opacity: f32,
    pub target_extent: TargetExtent,
    pub progress: ProgressRecord,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_folder: None,
            save_dir: None,
            pen: Pen::default(),
            background_opacity: 1.0,
            target_extent: TargetExtent::default(),
            progress: ProgressRecord::default(),
        }
    }
}

impl Settings {
    /// Settings file location: `$LINEPAIR_SETTINGS`, else the platform config dir.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match serialization::load::<Settings>(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        serialization::save(self, path)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Clamp values edited by hand into their valid ranges.
    fn sanitized(mut self) -> Self {
        self.pen = Pen::new(self.pen.color, self.pen.width);
        self.background_opacity = if self.background_opacity.is_finite() {
            self.background_opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Initial tool state for a new session.
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            tool: Tool::Pen,
            pen: self.pen,
            background_opacity: self.background_opacity,
            target_extent: self.target_extent,
        }
    }

    /// Remember the tool preferences of the running session.
    pub fn update_from(&mut self, tools: &ToolSettings) {
        self.pen = tools.pen;
        self.background_opacity = tools.background_opacity;
        self.target_extent = tools.target_extent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stroke::PenColor;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_or_default(&dir.path().join("settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_roundtrip_with_progress() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");

        let mut settings = Settings {
            save_dir: Some(PathBuf::from("/data/out")),
            pen: Pen::new(PenColor::new(10, 20, 30), 8.0),
            target_extent: TargetExtent::Background,
            ..Default::default()
        };
        settings.progress.switch_folder(Path::new("/data/in"));
        settings.progress.mark_saved(Path::new("/data/in/a.png"), "00000.png");
        settings.save(&path).unwrap();

        assert_eq!(Settings::load_or_default(&path), settings);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "pen": { "color": { "r": 1, "g": 2, "b": 3 }, "width": 0.0 }, "background_opacity": 4.0 }"#,
        )
        .unwrap();

        let settings = Settings::load_or_default(&path);
        assert_eq!(settings.pen.width, Pen::MIN_WIDTH);
        assert_eq!(settings.background_opacity, 1.0);
        assert_eq!(settings.target_extent, TargetExtent::StrokeBounds);
    }

    #[test]
    fn test_tool_settings_roundtrip() {
        let mut settings = Settings::default();
        let mut tools = settings.tool_settings();
        tools.pen = Pen::new(PenColor::new(255, 0, 0), 12.0);
        tools.background_opacity = 0.25;
        settings.update_from(&tools);
        assert_eq!(settings.pen.width, 12.0);
        assert_eq!(settings.background_opacity, 0.25);
    }
}
