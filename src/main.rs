#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use crop_studio::app::CropperApp;
use crop_studio::config::CropperConfig;
use eframe::egui;

fn main() -> eframe::Result {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = CropperConfig::from_env().unwrap_or_else(|err| {
        log::warn!("Ignoring invalid configuration: {err}");
        CropperConfig::default()
    });
    log::info!("Crop Studio starting up ({config:?})");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Crop Studio",
        options,
        Box::new(|cc| Ok(Box::new(CropperApp::new(cc, config)))),
    )
}
