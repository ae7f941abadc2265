//! Positional overlay
//!
//! Additively mixes one buffer into another at a millisecond offset.
//! Samples are summed channel-wise with no averaging or limiting.

use log::debug;

use crate::dsp::transform::{convert_channels, convert_rate, converted_frames};
use crate::engine::buffer::{ms_to_frames, AudioBuffer};
use crate::error::{MurmurError, Result};

/// What to do when the source runs past the end of the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    /// Drop source frames beyond the destination; output length == dest length
    #[default]
    Truncate,
    /// Grow the destination with silence to fit the whole source
    Extend,
    /// Return `LengthMismatch` instead of mixing
    Fail,
}

/// Mix `source` into `dest` starting at `offset_ms`, truncating to `dest`
///
/// The result always has exactly `dest`'s length, rate and channel count.
pub fn overlay(dest: AudioBuffer, source: AudioBuffer, offset_ms: f64) -> Result<AudioBuffer> {
    overlay_with(dest, source, offset_ms, OverlayMode::Truncate)
}

/// Mix `source` into `dest` starting at `offset_ms` under an explicit length policy
///
/// A source in a different format is first conformed to the destination:
/// channels are duplicated or averaged and the rate is converted by linear
/// interpolation. The offset is rounded to the nearest destination frame.
pub fn overlay_with(
    mut dest: AudioBuffer,
    source: AudioBuffer,
    offset_ms: f64,
    mode: OverlayMode,
) -> Result<AudioBuffer> {
    if !offset_ms.is_finite() || offset_ms < 0.0 {
        return Err(MurmurError::invalid(
            "offset_ms",
            format!("{} is not a valid position", offset_ms),
        ));
    }

    let mut source = convert_channels(source, dest.channels())?;

    let offset = ms_to_frames(offset_ms, dest.sample_rate);
    let source_frames = converted_frames(
        source.num_frames(),
        source.sample_rate as u64,
        dest.sample_rate as u64,
    );
    let required = offset + source_frames;
    let available = dest.num_frames();

    if required > available {
        match mode {
            OverlayMode::Truncate => {
                debug!(
                    "Overlay truncated: {} of {} source frames past the end",
                    required - available,
                    source_frames
                );
                // Only convert what lands inside dest, plus one frame for interpolation
                let keep = converted_frames(
                    available.saturating_sub(offset),
                    dest.sample_rate as u64,
                    source.sample_rate as u64,
                ) + 1;
                for channel in &mut source.samples {
                    channel.truncate(keep);
                }
            }
            OverlayMode::Extend => {
                for channel in &mut dest.samples {
                    channel.resize(required, 0.0);
                }
            }
            OverlayMode::Fail => {
                return Err(MurmurError::LengthMismatch {
                    required_frames: required,
                    available_frames: available,
                });
            }
        }
    }

    let source = convert_rate(source, dest.sample_rate);

    for (dst, src) in dest.samples.iter_mut().zip(&source.samples) {
        if offset >= dst.len() {
            continue;
        }
        for (d, s) in dst[offset..].iter_mut().zip(src) {
            *d += *s;
        }
    }

    Ok(dest)
}

// ============================================================================
// Tests
// ============================================================================
