// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: source images, dataset pairs and settings files.

pub mod export;
pub mod media;
pub mod serialization;
