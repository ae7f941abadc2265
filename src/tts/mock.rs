//! Deterministic stand-in synthesizer
//!
//! Renders a tone whose length grows with the text, so pipeline tests can
//! reason about affirmation durations without a real speech engine.

use super::SpeechSynthesizer;
use crate::engine::buffer::{ms_to_frames, AudioBuffer, ChannelLayout};
use crate::error::{MurmurError, Result};

/// Tone "speech": `ms_per_char` milliseconds of sine per character
#[derive(Debug, Clone, PartialEq)]
pub struct MockSynthesizer {
    pub sample_rate: u32,
    pub ms_per_char: f64,
    pub frequency: f32,
    pub amplitude: f32,
}

impl MockSynthesizer {
    pub fn new(sample_rate: u32, ms_per_char: f64) -> Self {
        Self {
            sample_rate,
            ms_per_char,
            frequency: 220.0,
            amplitude: 0.5,
        }
    }

    /// Duration the mock produces for `text`
    pub fn duration_for(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.ms_per_char
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        // Same rate real TTS engines commonly emit
        Self::new(24000, 60.0)
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioBuffer> {
        if language.is_empty() {
            return Err(MurmurError::Synthesis {
                reason: "no language given".to_string(),
            });
        }

        let frames = ms_to_frames(self.duration_for(text), self.sample_rate);
        let mut buffer = AudioBuffer::new(frames, ChannelLayout::Mono, self.sample_rate);
        let angular_freq = 2.0 * std::f32::consts::PI * self.frequency / self.sample_rate as f32;
        for (i, sample) in buffer.samples[0].iter_mut().enumerate() {
            *sample = self.amplitude * (angular_freq * i as f32).sin();
        }
        Ok(buffer)
    }
}
