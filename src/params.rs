use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::{DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY, DEFAULT_PHASE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneState {
    Muted,
    Sounding,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSnapshot {
    pub amplitude: f32,
    pub frequency: f32,
    /// Added to the sine argument unscaled.
    pub phase: f32,
    pub muted: bool,
}

// Each field is atomic on its own, with no ordering between fields.
pub struct ToneParams {
    amplitude: AtomicU32,
    frequency: AtomicU32,
    phase: AtomicU32,
    muted: AtomicBool,
}

impl ToneParams {
    pub fn new() -> Self {
        Self {
            amplitude: AtomicU32::new(DEFAULT_AMPLITUDE.to_bits()),
            frequency: AtomicU32::new(DEFAULT_FREQUENCY.to_bits()),
            phase: AtomicU32::new(DEFAULT_PHASE.to_bits()),
            muted: AtomicBool::new(false),
        }
    }

    // Mute is left as is.
    pub fn reset(&self) {
        self.set_amplitude(DEFAULT_AMPLITUDE);
        self.set_frequency_hz(DEFAULT_FREQUENCY);
        self.set_phase(DEFAULT_PHASE);
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        self.amplitude.store(amplitude.to_bits(), Ordering::Relaxed);
    }

    pub fn set_amplitude_from_decibels(&self, db: f32) {
        self.set_amplitude(decibels_to_gain(db));
    }

    pub fn set_frequency_hz(&self, hz: f32) {
        self.frequency.store(hz.to_bits(), Ordering::Relaxed);
    }

    pub fn set_phase(&self, phase: f32) {
        self.phase.store(phase.to_bits(), Ordering::Relaxed);
    }

    pub fn set_mute(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    /// Flips the mute flag and returns the new value.
    pub fn toggle_mute(&self) -> bool {
        !self.muted.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn amplitude(&self) -> f32 {
        f32::from_bits(self.amplitude.load(Ordering::Relaxed))
    }

    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.frequency.load(Ordering::Relaxed))
    }

    pub fn phase(&self) -> f32 {
        f32::from_bits(self.phase.load(Ordering::Relaxed))
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> ToneState {
        if self.is_muted() {
            ToneState::Muted
        } else {
            ToneState::Sounding
        }
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            amplitude: self.amplitude(),
            frequency: self.frequency(),
            phase: self.phase(),
            muted: self.is_muted(),
        }
    }
}

impl Default for ToneParams {
    fn default() -> Self {
        Self::new()
    }
}

pub fn decibels_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}
