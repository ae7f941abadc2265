//! Audio Buffer
//!
//! The PCM container passed between every decode, transform, mix and encode
//! step. Channels are stored separately as 32-bit floats where ±1.0 is
//! nominal full scale; values outside that range are legal until export.

use crate::error::{MurmurError, Result};

// ============================================================================
// Level and time helpers
// ============================================================================

/// Convert a decibel value to a linear amplitude factor
///
/// # Arguments
/// * `db` - Level in decibels; 0 dB is unity, negative attenuates
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear amplitude to decibels (`-inf` for zero or below)
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f32::NEG_INFINITY
    }
}

/// Peak absolute sample level across all channels, in dBFS
pub fn calculate_peak(buffer: &AudioBuffer) -> f32 {
    let peak = buffer
        .samples
        .iter()
        .flatten()
        .fold(0.0_f32, |peak, s| peak.max(s.abs()));
    linear_to_db(peak)
}

/// Frames spanned by `duration_ms` at `sample_rate`, rounded to the nearest frame
#[inline]
pub fn ms_to_frames(duration_ms: f64, sample_rate: u32) -> usize {
    (duration_ms * sample_rate as f64 / 1000.0).round().max(0.0) as usize
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Channel configurations murmur can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    Mono,
    /// Left then right
    #[default]
    Stereo,
}

impl ChannelLayout {
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Layout for a channel count, `None` for anything but 1 or 2
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// In-memory PCM audio tagged with its sample rate
///
/// Every channel holds the same number of frames. Operations in `dsp` and
/// `synth` consume a buffer and return a fresh one instead of editing a
/// shared instance.
///
/// # Example
/// ```
/// use murmur::engine::buffer::{AudioBuffer, ChannelLayout};
///
/// // Half a second of stereo silence at 8 kHz
/// let canvas = AudioBuffer::new(4000, ChannelLayout::Stereo, 8000);
/// assert_eq!(canvas.num_channels(), 2);
/// assert_eq!(canvas.duration_ms(), 500.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// One `Vec` per channel
    pub samples: Vec<Vec<f32>>,
    /// Nominal playback rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Silent buffer of `num_frames` frames
    pub fn new(num_frames: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0; num_frames]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Wrap per-channel sample vectors after checking their shape
    ///
    /// # Errors
    /// * `InvalidParameter` - zero sample rate or ragged channels
    /// * `UnsupportedFormat` - a channel count other than 1 or 2
    pub fn from_channels(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MurmurError::invalid("sample_rate", "must be positive"));
        }
        if ChannelLayout::from_count(samples.len()).is_none() {
            return Err(MurmurError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", samples.len()),
            });
        }
        let frames = samples[0].len();
        if samples.iter().any(|ch| ch.len() != frames) {
            return Err(MurmurError::invalid(
                "samples",
                "all channels must have the same number of frames",
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Split frame-ordered samples (L R L R ...) into channels
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let width = layout.num_channels();
        if interleaved.len() % width != 0 {
            return Err(MurmurError::invalid(
                "interleaved",
                format!("{} samples do not divide into {} channels", interleaved.len(), width),
            ));
        }

        let samples = (0..width)
            .map(|ch| interleaved.iter().skip(ch).step_by(width).copied().collect())
            .collect();
        Self::from_channels(samples, sample_rate)
    }

    /// Frame-ordered copy of the samples, as encoders expect
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.channels() * self.len());
        for frame in 0..self.len() {
            out.extend(self.samples.iter().map(|ch| ch[frame]));
        }
        out
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels()
    }

    /// Frames per channel
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.len()
    }

    /// `frames / sample_rate * 1000`; zero for an untagged buffer
    #[inline]
    pub fn duration_ms(&self) -> f64 {
        match self.sample_rate {
            0 => 0.0,
            rate => self.len() as f64 * 1000.0 / rate as f64,
        }
    }

    #[inline]
    pub fn is_stereo(&self) -> bool {
        self.channels() == 2
    }

    /// # Panics
    /// Panics if `index` is not a channel of this buffer
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// # Panics
    /// Panics if `index` is not a channel of this buffer
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// True when every sample is exactly zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().flatten().all(|&s| s == 0.0)
    }

    /// Same shape and rate, with every sample pair within `tolerance`
    pub fn approx_eq(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        self.sample_rate == other.sample_rate
            && self.channels() == other.channels()
            && self.len() == other.len()
            && self
                .samples
                .iter()
                .flatten()
                .zip(other.samples.iter().flatten())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

// ============================================================================
// Tests
// ============================================================================
