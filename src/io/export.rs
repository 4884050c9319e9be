// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset pair export.
//!
//! Writes the current document as one numbered training pair:
//!
//! ```text
//! <root>/input/NNNNN.png   background image, native resolution
//! <root>/target/NNNNN.png  stroke layer on a transparent canvas
//! ```
//!
//! The index is one past the largest index found in either directory, so
//! both halves of a pair always share a number. A failed target write
//! removes the input half again, leaving the destination as it was.

use crate::models::scene::Scene;
use crate::util::geometry::Rect;
use crate::util::raster;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const INPUT_DIR: &str = "input";
pub const TARGET_DIR: &str = "target";
pub const PAIR_EXTENSION: &str = "png";
/// Zero-padding width of pair indices. Larger indices simply widen.
pub const INDEX_WIDTH: usize = 5;

/// Errors raised by [`export_pair`]. None of them leave partial output behind.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no background image is loaded")]
    NoBackground,

    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan directory {path:?}: {source}")]
    ScanDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write input image {path:?}: {source}")]
    WriteInput {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write target image {path:?}: {source}")]
    WriteTarget {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to allocate a {width}x{height} target canvas")]
    Render { width: u32, height: u32 },

    #[error("pair index {last} is the largest representable index")]
    IndexExhausted { last: u64 },
}

/// Extent of the rendered target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetExtent {
    /// Tight bounds of the strokes; the full background when there are none.
    #[default]
    StrokeBounds,
    /// Always the full background rectangle.
    Background,
}

/// Sink for encoded pair images.
pub trait PairWriter {
    fn write_png(&mut self, path: &Path, image: &DynamicImage) -> image::ImageResult<()>;
}

/// Writes PNG files to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngFileWriter;

impl PairWriter for PngFileWriter {
    fn write_png(&mut self, path: &Path, image: &DynamicImage) -> image::ImageResult<()> {
        image.save_with_format(path, ImageFormat::Png)
    }
}

/// A successfully written pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPair {
    pub index: u64,
    pub input_path: PathBuf,
    pub target_path: PathBuf,
}

impl ExportedPair {
    /// File name shared by both halves, as recorded in the progress record.
    pub fn file_name(&self) -> String {
        pair_file_name(self.index)
    }
}

/// File name for a pair index, e.g. `00042.png`.
pub fn pair_file_name(index: u64) -> String {
    format!("{:0width$}.{}", index, PAIR_EXTENSION, width = INDEX_WIDTH)
}

/// Parse the index out of a pair file name: an all-digit stem with a png extension.
pub fn parse_pair_index(path: &Path) -> Option<u64> {
    let extension = path.extension()?.to_str()?;
    if !extension.eq_ignore_ascii_case(PAIR_EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

fn max_index_in(dir: &Path) -> Result<Option<u64>, ExportError> {
    let scan_error = |source| ExportError::ScanDir {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(scan_error(e)),
    };

    let mut max = None;
    for entry in entries {
        let entry = entry.map_err(scan_error)?;
        if let Some(index) = parse_pair_index(&entry.path()) {
            max = max.max(Some(index));
        }
    }
    Ok(max)
}

/// Next free pair index under `root`: 1 + the largest index in either
/// subdirectory, or 0 when there are none.
pub fn next_index(root: &Path) -> Result<u64, ExportError> {
    let input_max = max_index_in(&root.join(INPUT_DIR))?;
    let target_max = max_index_in(&root.join(TARGET_DIR))?;
    match input_max.max(target_max) {
        None => Ok(0),
        Some(last) => last
            .checked_add(1)
            .ok_or(ExportError::IndexExhausted { last }),
    }
}

/// Hides the background for the lifetime of the guard.
struct HiddenBackground<'a> {
    scene: &'a mut Scene,
    was_visible: bool,
}

impl<'a> HiddenBackground<'a> {
    fn new(scene: &'a mut Scene) -> Self {
        let was_visible = scene.set_background_visible(false);
        Self { scene, was_visible }
    }
}

impl Drop for HiddenBackground<'_> {
    fn drop(&mut self) {
        self.scene.set_background_visible(self.was_visible);
    }
}

/// Remove what a failed export produced. Best effort; failures are logged.
fn rollback(files: &[&Path], created_dirs: &[PathBuf]) {
    for file in files {
        match std::fs::remove_file(file) {
            Ok(()) => log::info!("Rolled back {}", file.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to roll back {}: {}", file.display(), e),
        }
    }
    for dir in created_dirs.iter().rev() {
        // Only succeeds while empty, which is the state we created it in
        if let Err(e) = std::fs::remove_dir(dir) {
            log::warn!("Failed to remove {}: {}", dir.display(), e);
        }
    }
}

/// Create each of `dirs` one level at a time and return every directory
/// that did not exist before, outermost first, so a rollback can remove
/// them innermost first.
fn ensure_dirs(dirs: &[&Path]) -> Result<Vec<PathBuf>, ExportError> {
    let mut created = Vec::new();
    for dir in dirs {
        let missing: Vec<&Path> = dir
            .ancestors()
            .filter(|level| !level.as_os_str().is_empty())
            .take_while(|level| !level.exists())
            .collect();
        for level in missing.into_iter().rev() {
            match std::fs::create_dir(level) {
                Ok(()) => created.push(level.to_path_buf()),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && level.is_dir() => {}
                Err(source) => {
                    rollback(&[], &created);
                    return Err(ExportError::CreateDir {
                        path: level.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }
    Ok(created)
}

/// PNG cannot hold 32-bit float samples; widen those to 16-bit.
fn png_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        _ => Cow::Borrowed(image),
    }
}

/// Export the scene as a pair under `root` using the filesystem writer.
pub fn export_pair(
    scene: &mut Scene,
    root: &Path,
    extent: TargetExtent,
) -> Result<ExportedPair, ExportError> {
    export_pair_with(scene, root, extent, &mut PngFileWriter)
}

/// Export the scene as a pair under `root` through `writer`.
pub fn export_pair_with<W: PairWriter>(
    scene: &mut Scene,
    root: &Path,
    extent: TargetExtent,
    writer: &mut W,
) -> Result<ExportedPair, ExportError> {
    let Some(background) = scene.background() else {
        return Err(ExportError::NoBackground);
    };
    let background_rect = background.rect();

    let input_dir = root.join(INPUT_DIR);
    let target_dir = root.join(TARGET_DIR);
    let created_dirs = ensure_dirs(&[input_dir.as_path(), target_dir.as_path()])?;

    let index = match next_index(root) {
        Ok(index) => index,
        Err(e) => {
            rollback(&[], &created_dirs);
            return Err(e);
        }
    };
    let file_name = pair_file_name(index);
    let input_path = input_dir.join(&file_name);
    let target_path = target_dir.join(&file_name);

    // Input half: the untouched background at native resolution
    if let Err(source) = writer.write_png(&input_path, &png_compatible(background.image())) {
        log::error!("Failed to write {}: {}", input_path.display(), source);
        rollback(&[input_path.as_path()], &created_dirs);
        return Err(ExportError::WriteInput {
            path: input_path,
            source,
        });
    }

    // Target half: the stroke layer alone
    let target_result = {
        let hidden = HiddenBackground::new(scene);
        let rect = match extent {
            TargetExtent::StrokeBounds => hidden
                .scene
                .bounding_box_of_strokes()
                .map(|bounds| bounds.snap_out())
                .unwrap_or(background_rect),
            TargetExtent::Background => background_rect,
        };
        render_target(hidden.scene, &rect).and_then(|target| {
            writer
                .write_png(&target_path, &DynamicImage::ImageRgba8(target))
                .map_err(|source| ExportError::WriteTarget {
                    path: target_path.clone(),
                    source,
                })
        })
    };

    if let Err(e) = target_result {
        log::error!("Export of pair {} failed: {}", file_name, e);
        rollback(&[target_path.as_path(), input_path.as_path()], &created_dirs);
        return Err(e);
    }

    log::info!("Exported pair {} to {}", file_name, root.display());
    Ok(ExportedPair {
        index,
        input_path,
        target_path,
    })
}

fn render_target(scene: &Scene, rect: &Rect) -> Result<image::RgbaImage, ExportError> {
    raster::render_strokes(scene.strokes(), rect).ok_or_else(|| {
        let (width, height) = rect.pixel_size();
        ExportError::Render { width, height }
    })
}
