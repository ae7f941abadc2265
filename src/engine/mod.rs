//! Audio Engine Module
//!
//! Core audio types and the file collaborators:
//! - Audio buffer management
//! - WAV decode, encode and duration probing

pub mod buffer;
pub mod io;

pub use buffer::{db_to_linear, linear_to_db, AudioBuffer, ChannelLayout};
pub use io::{
    export_audio, generate_stereo_test_tone, generate_test_tone, import_audio, probe_duration,
    resolve_output_path, ContainerFormat, ExportFormat,
};
