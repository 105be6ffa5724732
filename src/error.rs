use cpal::SampleFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoOutputDevice,
    #[error("output device reports no supported stream config")]
    NoSupportedConfig,
    #[error("unsupported sample format: {0:?}")]
    UnsupportedSampleFormat(SampleFormat),
    #[error(transparent)]
    DeviceName(#[from] cpal::DeviceNameError),
    #[error(transparent)]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
}
