use std::f64::consts::TAU;
use std::sync::Arc;

use dasp_sample::{FromSample, Sample};

use crate::params::{ParamSnapshot, ToneParams};

/// Sine tone renderer, owned by the audio callback.
pub struct ToneGenerator {
    params: Arc<ToneParams>,
    time: f64,
    sample_interval: f64,
    scratch: Vec<f32>,
}

impl ToneGenerator {
    pub fn new(params: Arc<ToneParams>) -> Self {
        Self {
            params,
            time: 0.0,
            sample_interval: 0.0,
            scratch: Vec::new(),
        }
    }

    /// Resets the tone parameters and rewinds the clock. `max_block_size` only
    /// sizes the scratch buffer; longer blocks are rendered in chunks.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.params.reset();
        self.time = 0.0;
        self.sample_interval = 1.0 / sample_rate;
        self.scratch.clear();
        self.scratch.resize(max_block_size.max(1), 0.0);
        log::debug!(
            "tone generator prepared at {} Hz, {} frame scratch",
            sample_rate,
            self.scratch.len()
        );
    }

    pub fn release(&mut self) {
        self.sample_interval = 0.0;
        log::debug!("tone generator released at t={:.3}s", self.time);
    }

    pub fn is_prepared(&self) -> bool {
        self.sample_interval > 0.0
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    #[cfg(test)]
    fn params(&self) -> &Arc<ToneParams> {
        &self.params
    }

    /// Renders `frames` frames into planar channel buffers.
    ///
    /// The clock advances by `frames` even with no channels. A channel shorter
    /// than `frames` gets what fits; samples past `frames` are zeroed.
    pub fn render(&mut self, frames: usize, channels: &mut [&mut [f32]]) {
        let Some(snapshot) = self.sounding_snapshot() else {
            for channel in channels.iter_mut() {
                channel.fill(0.0);
            }
            return;
        };

        let mut offset = 0;
        while offset < frames {
            let len = (frames - offset).min(self.scratch.len());
            self.synthesize(len, &snapshot);
            for channel in channels.iter_mut() {
                let end = (offset + len).min(channel.len());
                if end > offset {
                    channel[offset..end].copy_from_slice(&self.scratch[..end - offset]);
                }
            }
            offset += len;
        }

        for channel in channels.iter_mut() {
            if channel.len() > frames {
                channel[frames..].fill(0.0);
            }
        }
    }

    /// Interleaved variant for device buffers. Without channels there is no
    /// frame count, so nothing is rendered. A trailing partial frame is silent.
    pub fn render_interleaved<T>(&mut self, data: &mut [T], channel_count: usize)
    where
        T: Sample + FromSample<f32>,
    {
        if channel_count == 0 {
            return;
        }
        let frames = data.len() / channel_count;

        let Some(snapshot) = self.sounding_snapshot() else {
            data.fill(T::EQUILIBRIUM);
            return;
        };

        let mut offset = 0;
        while offset < frames {
            let len = (frames - offset).min(self.scratch.len());
            self.synthesize(len, &snapshot);
            let block = &mut data[offset * channel_count..(offset + len) * channel_count];
            for (frame, &value) in block.chunks_mut(channel_count).zip(&self.scratch[..len]) {
                frame.fill(T::from_sample(value));
            }
            offset += len;
        }

        data[frames * channel_count..].fill(T::EQUILIBRIUM);
    }

    fn sounding_snapshot(&self) -> Option<ParamSnapshot> {
        if !self.is_prepared() {
            return None;
        }
        let snapshot = self.params.snapshot();
        (!snapshot.muted).then_some(snapshot)
    }

    fn synthesize(&mut self, len: usize, snapshot: &ParamSnapshot) {
        let amplitude = f64::from(snapshot.amplitude);
        let omega = TAU * f64::from(snapshot.frequency);
        let phase = f64::from(snapshot.phase);

        for sample in &mut self.scratch[..len] {
            *sample = (amplitude * (omega * self.time + phase).sin()) as f32;
            self.time = advance(self.time, self.sample_interval);
        }
    }

    #[cfg(test)]
    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

impl Drop for ToneGenerator {
    fn drop(&mut self) {
        if self.is_prepared() {
            self.release();
        }
    }
}

// Wraps to zero instead of saturating at the top of the f64 range.
fn advance(time: f64, interval: f64) -> f64 {
    let next = time + interval;
    if next.is_finite() && next < f64::MAX {
        next
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 48_000.0;

    fn generator(max_block: usize) -> ToneGenerator {
        let mut tone = ToneGenerator::new(Arc::new(ToneParams::new()));
        tone.prepare(RATE, max_block);
        tone
    }

    fn render_mono(tone: &mut ToneGenerator, frames: usize) -> Vec<f32> {
        let mut out = vec![f32::NAN; frames];
        tone.render(frames, &mut [out.as_mut_slice()]);
        out
    }

    #[test]
    fn renders_unit_sine_from_time_zero() {
        for &freq in &[10.0_f32, 440.0, 1000.0, 22_000.0] {
            let mut tone = generator(512);
            tone.params().set_amplitude(1.0);
            tone.params().set_frequency_hz(freq);
            let out = render_mono(&mut tone, 300);
            for (k, &sample) in out.iter().enumerate() {
                let expected = (TAU * f64::from(freq) * k as f64 / RATE).sin();
                assert!(
                    (f64::from(sample) - expected).abs() < 1e-5,
                    "freq {freq} sample {k}: {sample} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn prepare_resets_params_and_clock() {
        let mut tone = generator(64);
        tone.params().set_frequency_hz(1234.0);
        tone.params().set_amplitude(0.9);
        tone.params().set_phase(0.75);
        render_mono(&mut tone, 100);
        assert!(tone.time() > 0.0);

        tone.prepare(44_100.0, 64);
        let snapshot = tone.params().snapshot();
        assert_eq!(snapshot.amplitude, 0.5);
        assert_eq!(snapshot.frequency, 500.0);
        assert_eq!(snapshot.phase, 0.0);
        assert_eq!(tone.time(), 0.0);
        assert_eq!(tone.sample_interval(), 1.0 / 44_100.0);
    }

    #[test]
    fn muted_blocks_are_silent_and_freeze_time() {
        let mut tone = generator(256);
        render_mono(&mut tone, 37);
        let frozen = tone.time();

        tone.params().set_mute(true);
        let first = render_mono(&mut tone, 128);
        let second = render_mono(&mut tone, 128);
        assert!(first.iter().all(|&s| s == 0.0));
        assert_eq!(first, second);
        assert_eq!(tone.time(), frozen);
    }

    #[test]
    fn split_blocks_match_single_block() {
        let mut whole = generator(1024);
        let mut split = generator(1024);
        for tone in [&mut whole, &mut split] {
            tone.params().set_frequency_hz(777.0);
            tone.params().set_phase(0.3);
        }

        let expected = render_mono(&mut whole, 700);
        let mut actual = render_mono(&mut split, 333);
        actual.extend(render_mono(&mut split, 367));
        assert_eq!(expected, actual);
    }

    #[test]
    fn blocks_longer_than_scratch_are_chunked() {
        let mut large = generator(4096);
        let mut small = generator(100);
        assert_eq!(render_mono(&mut large, 1000), render_mono(&mut small, 1000));
        assert_eq!(large.time(), small.time());
    }

    #[test]
    fn every_channel_gets_the_same_samples() {
        let mut tone = generator(64);
        tone.params().set_frequency_hz(3000.0);
        let mut left = vec![0.0_f32; 200];
        let mut right = vec![0.0_f32; 200];
        let mut third = vec![0.0_f32; 200];
        tone.render(200, &mut [&mut left[..], &mut right[..], &mut third[..]]);
        for k in 0..200 {
            assert_eq!(left[k].to_bits(), right[k].to_bits());
            assert_eq!(left[k].to_bits(), third[k].to_bits());
        }
        assert!(left.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn unmute_resumes_from_frozen_time() {
        let mut reference = generator(128);
        let mut muted = generator(128);

        let mut expected = render_mono(&mut reference, 128);
        expected.extend(render_mono(&mut reference, 128));

        let mut actual = render_mono(&mut muted, 128);
        muted.params().set_mute(true);
        for _ in 0..3 {
            render_mono(&mut muted, 128);
        }
        muted.params().set_mute(false);
        actual.extend(render_mono(&mut muted, 128));

        assert_eq!(expected, actual);
    }

    #[test]
    fn interleaved_matches_planar() {
        let mut planar = generator(50);
        let mut interleaved = generator(50);

        let mut left = vec![0.0_f32; 120];
        let mut right = vec![0.0_f32; 120];
        planar.render(120, &mut [&mut left[..], &mut right[..]]);

        let mut data = vec![0.0_f32; 240];
        interleaved.render_interleaved(&mut data, 2);
        for (k, frame) in data.chunks(2).enumerate() {
            assert_eq!(frame[0], left[k]);
            assert_eq!(frame[1], right[k]);
        }
    }

    #[test]
    fn interleaved_converts_sample_format() {
        let mut tone = generator(64);
        tone.params().set_mute(true);
        let mut data = vec![0_u16; 16];
        tone.render_interleaved(&mut data, 2);
        assert!(data.iter().all(|&s| s == u16::EQUILIBRIUM));

        tone.params().set_mute(false);
        tone.params().set_amplitude(1.0);
        tone.params().set_phase(std::f32::consts::FRAC_PI_2);
        let mut data = vec![0_i16; 4];
        tone.render_interleaved(&mut data, 2);
        assert!(data[0] > i16::MAX - 2);
        assert_eq!(data[0], data[1]);
    }

    #[test]
    fn trailing_partial_frame_is_silent() {
        let mut tone = generator(64);
        tone.params().set_phase(0.25);
        let mut data = vec![f32::NAN; 7];
        tone.render_interleaved(&mut data, 2);
        assert!(data[..6].iter().all(|&s| s != 0.0));
        assert_eq!(data[6], 0.0);
    }

    #[test]
    fn unprepared_generator_is_silent() {
        let mut tone = ToneGenerator::new(Arc::new(ToneParams::new()));
        let out = render_mono(&mut tone, 32);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(tone.time(), 0.0);

        tone.prepare(RATE, 32);
        render_mono(&mut tone, 32);
        tone.release();
        assert!(!tone.is_prepared());
        assert!(render_mono(&mut tone, 32).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn time_wraps_at_top_of_range() {
        let mut tone = generator(8);
        tone.set_time(f64::MAX);
        render_mono(&mut tone, 1);
        assert_eq!(tone.time(), 0.0);
    }

    #[test]
    fn short_channels_get_what_fits() {
        let mut tone = generator(64);
        tone.params().set_phase(0.25);
        let mut left = vec![f32::NAN; 10];
        let mut right = vec![f32::NAN; 4];
        tone.render(6, &mut [&mut left[..], &mut right[..]]);
        assert_eq!(&left[..4], &right[..]);
        assert!(left[4..6].iter().all(|&s| s != 0.0 && !s.is_nan()));
        assert!(left[6..].iter().all(|&s| s == 0.0));
        assert!((tone.time() - 6.0 / RATE).abs() < 1e-12);
    }

    #[test]
    fn clock_advances_without_channels() {
        let mut tone = generator(16);
        tone.render(40, &mut []);
        assert!((tone.time() - 40.0 / RATE).abs() < 1e-12);

        let frozen = tone.time();
        tone.params().set_mute(true);
        tone.render(40, &mut []);
        assert_eq!(tone.time(), frozen);
    }

    #[test]
    fn phase_is_added_to_the_sine_argument_as_is() {
        let mut tone = generator(16);
        tone.params().set_amplitude(1.0);
        tone.params().set_phase(0.25);
        let out = render_mono(&mut tone, 1);
        assert!((out[0] - 0.25_f32.sin()).abs() < 1e-6);
    }
}
