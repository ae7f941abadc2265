//! Subliminal track synthesis
//!
//! Speaks an affirmation block several times, matches the spoken track to a
//! background's length, drops it to a barely audible level and mixes it in.
//! The result always lasts exactly as long as the background.

use log::info;

use crate::config::SubliminalConfig;
use crate::dsp::mixer::overlay;
use crate::dsp::transform::gain;
use crate::engine::buffer::AudioBuffer;
use crate::error::{MurmurError, Result, StageContext};
use crate::synth::matcher::match_duration;
use crate::tts::SpeechSynthesizer;

/// Build the text handed to the synthesizer
///
/// The trimmed block is repeated `repetitions` times, each copy followed by
/// a single space so the speech engine pauses between blocks.
pub fn affirmation_text(block: &str, repetitions: usize) -> Result<String> {
    let block = block.trim();
    if block.is_empty() {
        return Err(MurmurError::invalid("affirmations", "text is empty"));
    }
    if repetitions == 0 {
        return Err(MurmurError::invalid("repetitions", "must be at least 1"));
    }
    Ok(format!("{} ", block).repeat(repetitions))
}

/// Generate a subliminal track over `background`
pub fn generate_subliminal<S: SpeechSynthesizer + ?Sized>(
    affirmations: &str,
    background: AudioBuffer,
    synthesizer: &S,
    config: &SubliminalConfig,
) -> Result<AudioBuffer> {
    config.validate()?;

    info!(
        "Preparing text block with {} repetitions of the affirmations",
        config.repetitions
    );
    let text = affirmation_text(affirmations, config.repetitions)?;

    info!("Generating affirmations audio track from the repeated text");
    let affs = synthesizer
        .synthesize(&text, &config.language)
        .stage("synthesize affirmations")?;

    let affs = match_duration(affs, &background).stage("match duration")?;

    info!(
        "Lowering affirmations volume by {} dB",
        config.attenuation_db
    );
    let affs = gain(affs, -config.attenuation_db);

    info!("Overlaying affirmations onto background audio");
    overlay(background, affs, 0.0).stage("overlay")
}
