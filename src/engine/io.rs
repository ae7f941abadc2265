//! Audio file I/O for Murmur
//!
//! Decoding, encoding and header probing for the files the synthesis
//! pipelines read and write. WAV is the only container handled here; audio
//! keeps its native sample rate on import.
//!
//! Exports are written to a temporary file next to the destination and
//! persisted only once the encoder has finished, so a failed export never
//! leaves a partial file behind.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use tempfile::NamedTempFile;

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{MurmurError, Result};

/// Output container, inferred from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Wav,
}

impl ContainerFormat {
    /// Container used when the output path has no extension
    pub const DEFAULT: ContainerFormat = ContainerFormat::Wav;

    /// Look up the container for a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Ok(ContainerFormat::Wav),
            other => Err(MurmurError::UnsupportedFormat {
                format: format!("'.{}' output (only .wav is supported)", other),
            }),
        }
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Wav => "wav",
        }
    }
}

/// Resolve the final output path and container for a requested path
///
/// A path without an extension gets the default container's extension
/// appended (`out` becomes `out.wav`).
pub fn resolve_output_path(path: &Path) -> Result<(PathBuf, ContainerFormat)> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => Ok((path.to_path_buf(), ContainerFormat::from_extension(ext)?)),
        None => {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(ContainerFormat::DEFAULT.extension());
            Ok((PathBuf::from(name), ContainerFormat::DEFAULT))
        }
    }
}

/// Export format configuration
#[derive(Debug, Clone)]
pub struct ExportFormat {
    /// Bit depth: 16, 24, or 32 (32 is written as float; default: 16)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat { bit_depth: 16 }
    }
}

impl ExportFormat {
    /// Create a new export format with the given bit depth
    pub fn new(bit_depth: u16) -> Self {
        ExportFormat { bit_depth }
    }

    /// 32-bit float output, no quantization
    pub fn float() -> Self {
        ExportFormat { bit_depth: 32 }
    }
}

/// Decode an audio file into a buffer at its native sample rate
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `Decode` - If the file is not a readable WAV file
/// * `UnsupportedFormat` - If the audio has more than 2 channels or an odd bit depth
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(MurmurError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| decode_error(path, "failed to open WAV file", e))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    let layout = ChannelLayout::from_count(channels).ok_or_else(|| {
        MurmurError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        }
    })?;

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)
        .map_err(|e| match e {
            DecodeFailure::Read(reason, source) => decode_error(path, &reason, source),
            DecodeFailure::Unsupported(format) => MurmurError::UnsupportedFormat { format },
        })?;

    let buffer = AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)?;
    debug!(
        "Decoded {}: {} frames, {} ch, {} Hz",
        path.display(),
        buffer.num_frames(),
        buffer.num_channels(),
        buffer.sample_rate
    );
    Ok(buffer)
}

/// Encode a buffer to `path` at the buffer's own sample rate
///
/// The container is taken from the path's extension, which must already be
/// resolved (see [`resolve_output_path`]). Samples are saturated to the
/// target integer range; 32-bit output is written as float without clamping.
pub fn export_audio(buffer: &AudioBuffer, path: &Path, format: &ExportFormat) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    ContainerFormat::from_extension(ext)?;

    if ChannelLayout::from_count(buffer.num_channels()).is_none() {
        return Err(MurmurError::UnsupportedFormat {
            format: format!("{}-channel audio", buffer.num_channels()),
        });
    }

    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: format.bit_depth,
        sample_format: if format.bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(dir).map_err(|e| encode_error(path, e))?;

    {
        let mut writer = WavWriter::new(BufWriter::new(staging.as_file_mut()), spec)
            .map_err(|e| encode_error(path, e))?;
        let interleaved = buffer.to_interleaved();

        match format.bit_depth {
            16 => {
                for sample in interleaved {
                    let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                    writer.write_sample(scaled).map_err(|e| encode_error(path, e))?;
                }
            }
            24 => {
                for sample in interleaved {
                    // 24-bit stored as i32 in hound
                    let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                    writer.write_sample(scaled).map_err(|e| encode_error(path, e))?;
                }
            }
            32 => {
                for sample in interleaved {
                    writer.write_sample(sample).map_err(|e| encode_error(path, e))?;
                }
            }
            _ => {
                return Err(MurmurError::UnsupportedFormat {
                    format: format!("{}-bit audio (only 16, 24, 32 supported)", format.bit_depth),
                });
            }
        }

        writer.finalize().map_err(|e| encode_error(path, e))?;
    }

    staging
        .persist(path)
        .map_err(|e| encode_error(path, e.error))?;

    debug!("Encoded {} ({:.1} ms)", path.display(), buffer.duration_ms());
    Ok(())
}

/// Read a file's duration in milliseconds from its header alone
pub fn probe_duration(path: &Path) -> Result<f64> {
    if !path.exists() {
        return Err(MurmurError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let reader = WavReader::open(path).map_err(|e| decode_error(path, "failed to read WAV header", e))?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return Err(MurmurError::Decode {
            path: path.display().to_string(),
            reason: "header reports a 0 Hz sample rate".to_string(),
            source: None,
        });
    }
    Ok(reader.duration() as f64 * 1000.0 / sample_rate as f64)
}

/// Generate a mono sine test tone with 0.5 amplitude
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_frames = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_frames, ChannelLayout::Mono, sample_rate);

    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
    for (i, sample) in buffer.samples[0].iter_mut().enumerate() {
        *sample = 0.5 * (angular_freq * i as f32).sin();
    }

    buffer
}

/// Generate a stereo test tone with a different frequency per channel
pub fn generate_stereo_test_tone(
    freq_left: f32,
    freq_right: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> AudioBuffer {
    let left = generate_test_tone(freq_left, duration_secs, sample_rate);
    let right = generate_test_tone(freq_right, duration_secs, sample_rate);

    let mut samples = left.samples;
    samples.extend(right.samples);
    AudioBuffer {
        samples,
        sample_rate,
    }
}

// ============================================================================
// Internal helper functions
// ============================================================================

enum DecodeFailure {
    Read(String, hound::Error),
    Unsupported(String),
}

fn decode_error(path: &Path, reason: &str, e: hound::Error) -> MurmurError {
    MurmurError::Decode {
        path: path.display().to_string(),
        reason: format!("{}: {}", reason, e),
        source: Some(Box::new(e)),
    }
}

fn encode_error(path: &Path, e: impl std::fmt::Display) -> MurmurError {
    MurmurError::Encode {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> std::result::Result<Vec<f32>, DecodeFailure> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| DecodeFailure::Read("failed to read float samples".into(), e)),
        SampleFormat::Int => {
            let scale = match bits_per_sample {
                8 => 128.0,
                16 => 32768.0,
                24 => 8388608.0,
                32 => 2147483648.0,
                _ => {
                    return Err(DecodeFailure::Unsupported(format!(
                        "{}-bit integer audio",
                        bits_per_sample
                    )))
                }
            };
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| {
                    DecodeFailure::Read(
                        format!("failed to read {}-bit samples", bits_per_sample),
                        e,
                    )
                })
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
