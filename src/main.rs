// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! LinePair - line-art dataset pair builder
//!
//! A desktop tool for building paired training data: load a folder of
//! photos, trace line art over each one with a pen and eraser, and save
//! every photo/mask pair under sequentially numbered file names.

mod app;
mod config;
mod document;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::LinePairApp;
use config::Settings;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings_path = Settings::default_path();
    let settings = match &settings_path {
        Some(path) => Settings::load_or_default(path),
        None => {
            log::warn!("No config directory available; settings will not be saved");
            Settings::default()
        }
    };

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("LinePair - Line-art Dataset Builder"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "LinePair",
        options,
        Box::new(|_cc| Ok(Box::new(LinePairApp::new(settings, settings_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
