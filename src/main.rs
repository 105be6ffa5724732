mod audio;
mod config;
mod error;
mod params;
mod tone;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;

use audio::AudioOutput;
use config::Settings;
use params::ToneParams;
use ui::ToneUI;

struct ToneApp {
    ui: ToneUI,
    _output: AudioOutput,
}

impl eframe::App for ToneApp {
    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        self.ui.update(ctx);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::default();
    let params = Arc::new(ToneParams::new());
    let errors = Arc::new(Mutex::new(None));

    let output = audio::start(Arc::clone(&params), settings.max_block_size, Arc::clone(&errors))
        .context("failed to start audio output")?;
    log::info!(
        "playing on {} at {} Hz, {} channels",
        output.device_name,
        output.sample_rate,
        output.channels
    );

    let options = eframe::NativeOptions {
        initial_window_size: Some(eframe::egui::Vec2::from(settings.window_size)),
        ..Default::default()
    };

    let title = settings.title.clone();
    let ui = ToneUI::new(params, errors, settings);

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Box::new(ToneApp { ui, _output: output })),
    )
    .map_err(|e| anyhow::anyhow!("application error: {}", e))?;

    Ok(())
}
