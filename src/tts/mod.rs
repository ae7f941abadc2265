//! Text-to-speech collaborators
//!
//! The subliminal pipeline only needs text rendered to a buffer; how that
//! happens is behind [`SpeechSynthesizer`].

mod command;
mod mock;

pub use command::CommandSynthesizer;
pub use mock::MockSynthesizer;

use crate::engine::buffer::AudioBuffer;
use crate::error::Result;

/// Renders text to audio
pub trait SpeechSynthesizer {
    /// Speak `text` in `language` (an ISO code such as `en`)
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioBuffer>;
}
