//! Error handling for Murmur
//!
//! Every failure is terminal for the current synthesis call. Errors carry
//! enough context (path, parameter name, pipeline stage) to tell which step
//! of a babble or subliminal run went wrong.

use thiserror::Error;

/// Result type alias for Murmur operations
pub type Result<T> = std::result::Result<T, MurmurError>;

/// Main error type for Murmur operations
#[derive(Error, Debug)]
pub enum MurmurError {
    // Decode Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Could not decode {path}: {reason}")]
    Decode {
        path: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Parameter Errors
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    // Mixing Errors
    #[error(
        "Length mismatch: overlay needs {required_frames} frames but destination has {available_frames}"
    )]
    LengthMismatch {
        required_frames: usize,
        available_frames: usize,
    },

    // Encode Errors
    #[error("Could not encode {path}: {reason}")]
    Encode { path: String, reason: String },

    // Collaborator Errors
    #[error("Speech synthesis failed: {reason}")]
    Synthesis { reason: String },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<MurmurError>,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MurmurError {
    /// Shorthand for building an `InvalidParameter` error
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        MurmurError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            MurmurError::FileNotFound { .. } => "FILE_NOT_FOUND",
            MurmurError::Decode { .. } => "DECODE_ERROR",
            MurmurError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            MurmurError::InvalidParameter { .. } => "INVALID_PARAMETER",
            MurmurError::LengthMismatch { .. } => "LENGTH_MISMATCH",
            MurmurError::Encode { .. } => "ENCODE_ERROR",
            MurmurError::Synthesis { .. } => "SYNTHESIS_ERROR",
            MurmurError::Stage { source, .. } => source.error_code(),
            MurmurError::Io(_) => "IO_ERROR",
            MurmurError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Name of the pipeline stage that failed, if one was recorded
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            MurmurError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Check if the user can fix this error by changing inputs and re-running
    pub fn is_recoverable(&self) -> bool {
        match self {
            MurmurError::FileNotFound { .. } => true,
            MurmurError::Decode { .. } => true,
            MurmurError::UnsupportedFormat { .. } => true,
            MurmurError::InvalidParameter { .. } => true,
            MurmurError::Stage { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MurmurError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            MurmurError::Decode { .. } => vec![
                "Try converting the file to WAV format first",
                "The file may be corrupted - try re-exporting from source",
            ],
            MurmurError::UnsupportedFormat { .. } => vec![
                "Convert to a mono or stereo WAV file",
                "Use a .wav extension for the output path",
            ],
            MurmurError::InvalidParameter { .. } => vec![
                "Run with --help to see accepted ranges",
                "Check the values in your --config file",
            ],
            MurmurError::Synthesis { .. } => vec![
                "Make sure the speech synthesizer (espeak-ng) is installed",
                "Pass --tts-program to point at another synthesizer",
            ],
            MurmurError::Encode { .. } => vec![
                "Check the output directory is writable",
                "Free up disk space",
            ],
            MurmurError::Stage { source, .. } => source.recovery_suggestions(),
            _ => vec![],
        }
    }
}

/// Attach the failing pipeline stage to an error
pub trait StageContext<T> {
    fn stage(self, stage: &'static str) -> Result<T>;
}

impl<T> StageContext<T> for Result<T> {
    fn stage(self, stage: &'static str) -> Result<T> {
        self.map_err(|source| MurmurError::Stage {
            stage,
            source: Box::new(source),
        })
    }
}
