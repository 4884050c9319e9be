// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-image progress tracking.
//!
//! Maps each source image (by absolute path) to what happened to it:
//! skipped, or saved as a numbered pair. Images with no entry have not
//! been processed yet. The record is persisted with the settings and is
//! reset when the user switches to a different source folder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Marker stored for skipped images.
pub const SKIP_MARKER: &str = "skipped";

/// Outcome for a processed source image.
///
/// Persisted as a plain string: the skip marker or the saved file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Outcome {
    Skipped,
    SavedAs(String),
}

impl From<String> for Outcome {
    fn from(value: String) -> Self {
        if value == SKIP_MARKER {
            Outcome::Skipped
        } else {
            Outcome::SavedAs(value)
        }
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Skipped => SKIP_MARKER.to_string(),
            Outcome::SavedAs(name) => name,
        }
    }
}

/// Persisted progress for one source folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    /// Source folder the entries belong to
    pub folder: Option<PathBuf>,
    entries: BTreeMap<String, Outcome>,
}

fn key(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute.to_string_lossy().into_owned()
}

impl ProgressRecord {
    /// Point the record at `folder`. Entries are dropped when the folder changes.
    /// Returns true if the record was reset.
    pub fn switch_folder(&mut self, folder: &Path) -> bool {
        let folder = std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf());
        if self.folder.as_deref() == Some(folder.as_path()) {
            return false;
        }
        log::info!(
            "Progress reset for folder {} ({} entries dropped)",
            folder.display(),
            self.entries.len()
        );
        self.folder = Some(folder);
        self.entries.clear();
        true
    }

    /// Outcome recorded for `path`; `None` means not processed yet.
    pub fn status(&self, path: &Path) -> Option<&Outcome> {
        self.entries.get(&key(path))
    }

    pub fn mark_skipped(&mut self, path: &Path) {
        log::info!("Marked {} as skipped", path.display());
        self.entries.insert(key(path), Outcome::Skipped);
    }

    pub fn mark_saved(&mut self, path: &Path, name: impl Into<String>) {
        let name = name.into();
        log::info!("Marked {} as saved ({})", path.display(), name);
        self.entries.insert(key(path), Outcome::SavedAs(name));
    }

    pub fn saved_count(&self) -> usize {
        self.entries
            .values()
            .filter(|o| matches!(o, Outcome::SavedAs(_)))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .values()
            .filter(|o| matches!(o, Outcome::Skipped))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_lookup() {
        let mut progress = ProgressRecord::default();
        let a = Path::new("/data/photos/a.jpg");
        let b = Path::new("/data/photos/b.jpg");

        assert_eq!(progress.status(a), None);
        progress.mark_skipped(a);
        progress.mark_saved(b, "00003.png");

        assert_eq!(progress.status(a), Some(&Outcome::Skipped));
        assert_eq!(
            progress.status(b),
            Some(&Outcome::SavedAs("00003.png".to_string()))
        );
        assert_eq!(progress.saved_count(), 1);
        assert_eq!(progress.skipped_count(), 1);

        // Saving later overrides a skip
        progress.mark_saved(a, "00004.png");
        assert_eq!(progress.skipped_count(), 0);
    }

    #[test]
    fn test_switch_folder_resets_only_on_change() {
        let mut progress = ProgressRecord::default();
        assert!(progress.switch_folder(Path::new("/data/photos")));
        progress.mark_skipped(Path::new("/data/photos/a.jpg"));

        assert!(!progress.switch_folder(Path::new("/data/photos")));
        assert_eq!(progress.len(), 1);

        assert!(progress.switch_folder(Path::new("/data/other")));
        assert!(progress.is_empty());
    }

    #[test]
    fn test_outcome_serializes_as_plain_string() {
        let mut progress = ProgressRecord::default();
        progress.mark_skipped(Path::new("/x/a.png"));
        progress.mark_saved(Path::new("/x/b.png"), "00000.png");

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["entries"]["/x/a.png"], SKIP_MARKER);
        assert_eq!(json["entries"]["/x/b.png"], "00000.png");

        let back: ProgressRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, progress);
    }
}
