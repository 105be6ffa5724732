use std::ops::RangeInclusive;

pub const DEFAULT_AMPLITUDE: f32 = 0.5;
pub const DEFAULT_FREQUENCY: f32 = 500.0;
pub const DEFAULT_PHASE: f32 = 0.0;

/// Window, slider and buffer settings for the tone generator app.
#[derive(Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub window_size: [f32; 2],
    /// Frames the mono scratch buffer holds. Larger host blocks are rendered in chunks.
    pub max_block_size: usize,
    pub volume_db: f32,
    pub volume_range: RangeInclusive<f32>,
    pub frequency_range: RangeInclusive<f32>,
    pub phase_range: RangeInclusive<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Sine Tone".to_owned(),
            window_size: [480.0, 140.0],
            max_block_size: 4096,
            volume_db: -6.0,
            volume_range: -96.0..=6.0,
            frequency_range: 10.0..=22000.0,
            phase_range: 0.0..=1.0,
        }
    }
}
