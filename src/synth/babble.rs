//! Babbling-crowd synthesis
//!
//! Layers many randomized copies of one clip onto a silent canvas. Each voice
//! gets its own volume, stereo position, pitch and start delay. Randomness is
//! injected by the caller so runs can be reproduced from a seed.

use log::{debug, info};
use rand::Rng;

use crate::config::BabbleConfig;
use crate::dsp::mixer::overlay;
use crate::dsp::transform::{gain, pan, resample_rate, silent, to_stereo};
use crate::engine::buffer::AudioBuffer;
use crate::error::Result;

/// Voices are spread across this much of the stereo field on either side
pub const PAN_SPREAD: f32 = 0.9;

/// Randomized variation applied to one voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Attenuation magnitude; the applied gain is its negation
    pub volume_reduction_db: f32,
    /// Stereo position in [-PAN_SPREAD, PAN_SPREAD]
    pub pan_position: f32,
    /// Rate reinterpretation factor (pitch and speed together)
    pub pitch_factor: f64,
    /// Where the voice starts on the canvas
    pub start_offset_ms: u32,
}

impl VoiceParams {
    /// Draw one voice's parameters
    ///
    /// Volume reduction is uniform between the two configured endpoints
    /// whichever of them is larger. The config is validated first, so a
    /// non-finite range is an error rather than a panic in the sampler.
    pub fn draw<R: Rng + ?Sized>(config: &BabbleConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let (quiet, loud) = (
            config.min_volume_reduction_db,
            config.max_volume_reduction_db,
        );
        let (low, high) = if quiet <= loud { (quiet, loud) } else { (loud, quiet) };

        Ok(Self {
            volume_reduction_db: rng.random_range(low..=high),
            pan_position: rng.random_range(-PAN_SPREAD..=PAN_SPREAD),
            pitch_factor: rng.random_range(
                1.0 - config.pitch_variation..=1.0 + config.pitch_variation,
            ),
            start_offset_ms: rng.random_range(0..=config.max_delay_ms),
        })
    }
}

/// Generate a babble track from `source`
///
/// The output lasts exactly `source` + `max_delay_ms` and is stereo (a mono
/// source is duplicated into both channels before panning). Voices that run
/// past the canvas after a downward pitch shift are cut at the canvas end.
pub fn generate_babble<R: Rng + ?Sized>(
    source: &AudioBuffer,
    config: &BabbleConfig,
    rng: &mut R,
) -> Result<AudioBuffer> {
    config.validate()?;

    let voices = (0..config.num_voices)
        .map(|_| VoiceParams::draw(config, &mut *rng))
        .collect::<Result<Vec<_>>>()?;

    render_babble(source, &voices, config.max_delay_ms)
}

/// Mix `source` onto a fresh canvas once per entry in `voices`
///
/// Each voice is built, mixed and dropped before the next one, so at most
/// the canvas and a single voice are held at a time.
pub fn render_babble(
    source: &AudioBuffer,
    voices: &[VoiceParams],
    max_delay_ms: u32,
) -> Result<AudioBuffer> {
    let source = to_stereo(source.clone());

    let mut canvas = silent(
        source.duration_ms() + max_delay_ms as f64,
        source.sample_rate,
        source.channels(),
    )?;

    info!(
        "Generating {} voices onto a {:.0} ms canvas",
        voices.len(),
        canvas.duration_ms()
    );

    for (i, params) in voices.iter().enumerate() {
        debug!(
            "Voice {}/{}: -{:.1} dB, pan {:+.2}, pitch x{:.3}, start {} ms",
            i + 1,
            voices.len(),
            params.volume_reduction_db,
            params.pan_position,
            params.pitch_factor,
            params.start_offset_ms
        );

        let voice = gain(source.clone(), -params.volume_reduction_db);
        let voice = pan(voice, params.pan_position)?;
        let voice = resample_rate(voice, params.pitch_factor)?;

        canvas = overlay(canvas, voice, params.start_offset_ms as f64)?;
    }

    Ok(canvas)
}
