use egui::Color32;
use std::sync::Arc;

use crate::audio::StreamErrorSlot;
use crate::config::Settings;
use crate::params::{ToneParams, ToneState};

const SLIDER_LABEL_WIDTH: f32 = 50.0;

pub struct ToneUI {
    params: Arc<ToneParams>,
    errors: StreamErrorSlot,
    settings: Settings,
    volume_db: f32,
    frequency: f32,
    phase: f32,
}

impl ToneUI {
    pub fn new(params: Arc<ToneParams>, errors: StreamErrorSlot, settings: Settings) -> Self {
        Self {
            volume_db: settings.volume_db,
            frequency: params.frequency(),
            phase: params.phase(),
            params,
            errors,
            settings,
        }
    }

    pub fn update(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical(|ui| {
                self.draw_sliders(ui);
                ui.add_space(6.0);
                self.draw_mute_button(ui);
                self.draw_status(ui);
            });
        });
    }

    fn draw_sliders(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width() - SLIDER_LABEL_WIDTH - 10.0;
        ui.spacing_mut().slider_width = width.max(80.0);

        ui.horizontal(|ui| {
            ui.add_sized([SLIDER_LABEL_WIDTH, 20.0], egui::Label::new("Volume"));
            let slider = egui::Slider::new(&mut self.volume_db, self.settings.volume_range.clone())
                .suffix(" db");
            if ui.add(slider).changed() {
                self.params.set_amplitude_from_decibels(self.volume_db);
            }
        });

        ui.horizontal(|ui| {
            ui.add_sized([SLIDER_LABEL_WIDTH, 20.0], egui::Label::new("Phase"));
            let slider = egui::Slider::new(&mut self.phase, self.settings.phase_range.clone())
                .suffix(" ~");
            if ui.add(slider).changed() {
                self.params.set_phase(self.phase);
            }
        });

        ui.horizontal(|ui| {
            ui.add_sized([SLIDER_LABEL_WIDTH, 20.0], egui::Label::new("Freq"));
            // Log scale keeps 500 Hz near the middle of the track.
            let slider = egui::Slider::new(&mut self.frequency, self.settings.frequency_range.clone())
                .logarithmic(true)
                .suffix(" Hz");
            if ui.add(slider).changed() {
                self.params.set_frequency_hz(self.frequency);
            }
        });
    }

    fn draw_mute_button(&mut self, ui: &mut egui::Ui) {
        let label = match self.params.state() {
            ToneState::Muted => "Unmute",
            ToneState::Sounding => "Mute",
        };
        let button = egui::Button::new(label);
        if ui.add_sized([ui.available_width(), 20.0], button).clicked() {
            let muted = self.params.toggle_mute();
            log::debug!("mute toggled: {}", muted);
        }
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        if let Some(err) = self.errors.lock().as_deref() {
            ui.colored_label(Color32::RED, format!("Stream error: {}", err));
        }
    }
}
