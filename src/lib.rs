//! Murmur - Layered Audio Synthesis
//!
//! Murmur builds two kinds of layered audio from a single source track:
//! 1. Babble - a crowd of randomized pitch/pan/volume/delay copies of one clip
//! 2. Subliminal - an affirmation track, matched in length to a background,
//!    attenuated and mixed underneath it
//!
//! # Architecture
//!
//! - `engine`: the PCM buffer type and WAV file I/O
//! - `dsp`: pure buffer transforms and the positional mixer
//! - `synth`: the babble and subliminal pipelines plus duration matching
//! - `tts`: text-to-speech collaborators

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod synth;
pub mod tts;

pub use error::{MurmurError, Result};
