use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample};
use dasp_sample::FromSample;
use parking_lot::Mutex;

use crate::error::AudioError;
use crate::params::ToneParams;
use crate::tone::ToneGenerator;

/// Last error reported by the output stream, shown in the UI.
pub type StreamErrorSlot = Arc<Mutex<Option<String>>>;

/// A running output stream. Dropping it stops playback.
pub struct AudioOutput {
    _stream: cpal::Stream,
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        log::info!("stopping output on {}", self.device_name);
    }
}

/// Opens the default output device and starts playing the tone.
pub fn start(
    params: Arc<ToneParams>,
    max_block_size: usize,
    errors: StreamErrorSlot,
) -> Result<AudioOutput, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoOutputDevice)?;
    let device_name = device.name()?;
    log::info!("output device: {}", device_name);

    let supported_config = device
        .supported_output_configs()?
        .next()
        .ok_or(AudioError::NoSupportedConfig)?
        .with_max_sample_rate();
    log::info!("output config: {:?}", supported_config);

    let sample_format = supported_config.sample_format();
    let config: cpal::StreamConfig = supported_config.into();

    let stream = match sample_format {
        SampleFormat::F32 => run::<f32>(&device, &config, params, max_block_size, errors)?,
        SampleFormat::I16 => run::<i16>(&device, &config, params, max_block_size, errors)?,
        SampleFormat::U16 => run::<u16>(&device, &config, params, max_block_size, errors)?,
        other => return Err(AudioError::UnsupportedSampleFormat(other)),
    };

    Ok(AudioOutput {
        _stream: stream,
        device_name,
        sample_rate: config.sample_rate.0,
        channels: config.channels,
    })
}

fn run<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    params: Arc<ToneParams>,
    max_block_size: usize,
    errors: StreamErrorSlot,
) -> Result<cpal::Stream, AudioError>
where
    T: Sample + SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut tone = ToneGenerator::new(params);
    tone.prepare(f64::from(config.sample_rate.0), max_block_size);
    log::debug!("sample interval: {}s", tone.sample_interval());

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            tone.render_interleaved(data, channels)
        },
        move |err| {
            log::error!("an error occurred on stream: {}", err);
            *errors.lock() = Some(err.to_string());
        },
        None,
    )?;

    stream.play()?;

    Ok(stream)
}
