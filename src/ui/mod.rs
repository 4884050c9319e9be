// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the LinePair application.

pub mod canvas;
pub mod file_list;
pub mod toolbar;
