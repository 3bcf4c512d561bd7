// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Steem Composer - Main Entry Point
//!
//! A desktop editor for writing open-source contribution posts and
//! publishing them to the Steem blockchain. Built with Rust and egui.

mod app;
mod backend;
mod config;
mod drafts;
mod editor;
mod error;
mod export;
mod files;
mod markdown;
mod net;
mod post;
mod state;
mod string_utils;
mod ui;

use app::ComposerApp;
use config::{load_config, Settings, APP_NAME};
use log::info;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // Load settings to get window configuration
    let settings = load_config();
    let window_size = &settings.window_size;

    info!(
        "Window configuration: {}x{}, maximized: {}",
        window_size.width, window_size.height, window_size.maximized
    );

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title("Steem Composer")
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([Settings::MIN_WINDOW_SIZE, 300.0])
        .with_drag_and_drop(true);

    // Apply maximized state
    let viewport = if window_size.maximized {
        viewport.with_maximized(true)
    } else {
        viewport
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(ComposerApp::new(cc)))),
    )
}
