// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: strokes, the scene, undo history and per-image progress.

pub mod history;
pub mod progress;
pub mod scene;
pub mod stroke;
