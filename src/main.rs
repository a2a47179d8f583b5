// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod connectivity;
mod engine;
mod forecast;
mod form;
mod gui;
mod i18n;
mod notify;
mod session;
mod types;
mod visualizer;

use crate::config::AppConfig;
use eframe::egui;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const CUSTOM_FONT: &str = "custom_font";

// Cyrillic is covered by the bundled fonts; `ui.font_path` only adds a fallback.
fn setup_fonts(ctx: &egui::Context, font_path: Option<&Path>) {
    let mut fonts = egui::FontDefinitions::default();

    // 1. optional extra font, appended after the defaults
    if let Some(path) = font_path {
        match fs::read(path) {
            Ok(bytes) => {
                fonts
                    .font_data
                    .insert(CUSTOM_FONT.to_owned(), egui::FontData::from_owned(bytes));
                if let Some(proportional) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
                    proportional.push(CUSTOM_FONT.to_owned());
                }
                if let Some(monospace) = fonts.families.get_mut(&egui::FontFamily::Monospace) {
                    monospace.push(CUSTOM_FONT.to_owned());
                }
            }
            Err(e) => log::warn!("cannot load font {}: {e}", path.display()),
        }
    }
    ctx.set_fonts(fonts);

    // 2. 12 pt body text
    let mut style = (*ctx.style()).clone();
    for (text_style, font_id) in style.text_styles.iter_mut() {
        match text_style {
            egui::TextStyle::Body | egui::TextStyle::Button => font_id.size = 16.0,
            egui::TextStyle::Heading => font_id.size = 20.0,
            _ => {}
        }
    }
    ctx.set_style(style);
}

fn load_config() -> AppConfig {
    match config::write_default_config(Path::new(config::CONFIG_FILE)) {
        Ok(true) => log::info!("wrote default configuration to {}", config::CONFIG_FILE),
        Ok(false) => {}
        Err(e) => log::warn!("{e:#}"),
    }
    match config::load_app_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{e:#}; falling back to built-in defaults");
            AppConfig::default()
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    // 1. configuration, shared read-only with the GUI
    let config = Arc::new(load_config());
    log::info!(
        "{} bearings, notification backend {:?}",
        config.bearings.len(),
        config.notify.backend
    );

    // 2. window
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 680.0])
            .with_min_inner_size([420.0, 420.0])
            .with_title("Bearing Monitor"),
        ..Default::default()
    };

    eframe::run_native(
        "bearing_monitor",
        options,
        Box::new(move |cc| {
            // 3. fonts before the first frame, then the app spawns its engine
            setup_fonts(&cc.egui_ctx, config.ui.font_path.as_deref());
            Box::new(gui::VibrationApp::new(cc, config))
        }),
    )
}
