//! External-program speech synthesis
//!
//! Runs a command-line synthesizer that writes a WAV file, then decodes it.
//! Arguments may contain `{lang}`, `{text}` (path to a file holding the
//! text) and `{out}` (path the program must write to).

use std::process::Command;

use log::debug;

use super::SpeechSynthesizer;
use crate::engine::buffer::AudioBuffer;
use crate::engine::io::import_audio;
use crate::error::{MurmurError, Result};

const DEFAULT_PROGRAM: &str = "espeak-ng";
const DEFAULT_ARGS: [&str; 6] = ["-v", "{lang}", "-w", "{out}", "-f", "{text}"];

/// Speech synthesizer backed by an external program
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// Use `program` with explicit argument templates
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Use `program` with espeak-compatible arguments
    pub fn with_program(program: impl Into<String>) -> Self {
        Self::new(program, DEFAULT_ARGS.iter().map(|s| s.to_string()).collect())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Substitute placeholders in the argument templates
    pub fn render_args(&self, language: &str, text_path: &str, out_path: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{lang}", language)
                    .replace("{text}", text_path)
                    .replace("{out}", out_path)
            })
            .collect()
    }
}

impl Default for CommandSynthesizer {
    fn default() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioBuffer> {
        let workdir = tempfile::tempdir()?;
        let text_path = workdir.path().join("affirmations.txt");
        let out_path = workdir.path().join("speech.wav");
        std::fs::write(&text_path, text)?;

        let args = self.render_args(
            language,
            &text_path.display().to_string(),
            &out_path.display().to_string(),
        );
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| MurmurError::Synthesis {
                reason: format!("could not run '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(MurmurError::Synthesis {
                reason: format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        import_audio(&out_path).map_err(|e| MurmurError::Synthesis {
            reason: format!("'{}' produced unreadable audio: {}", self.program, e),
        })
    }
}
