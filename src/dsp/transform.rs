//! Buffer transforms
//!
//! Pure functions over [`AudioBuffer`]: each takes a buffer by value and
//! returns a new one. Gain and pan operate in the float domain and never
//! clamp; saturation to the output bit depth happens only on export.

use log::debug;

use crate::engine::buffer::{db_to_linear, ms_to_frames, AudioBuffer, ChannelLayout};
use crate::error::{MurmurError, Result};

/// Scale every sample by `10^(db/20)`
///
/// Negative `db` attenuates, positive boosts. No clipping is applied.
pub fn gain(mut buffer: AudioBuffer, db: f32) -> AudioBuffer {
    let gain_linear = db_to_linear(db);

    // Unity gain optimization
    if (gain_linear - 1.0).abs() < f32::EPSILON {
        return buffer;
    }

    for channel in &mut buffer.samples {
        for sample in channel.iter_mut() {
            *sample *= gain_linear;
        }
    }
    buffer
}

/// Linear stereo pan
///
/// `position` runs from -1.0 (hard left) to 1.0 (hard right). The left
/// channel is scaled by `1 - max(position, 0)` and the right channel by
/// `1 - max(-position, 0)`, so centre is a no-op and the law is symmetric.
pub fn pan(mut buffer: AudioBuffer, position: f32) -> Result<AudioBuffer> {
    if !buffer.is_stereo() {
        return Err(MurmurError::invalid(
            "buffer",
            format!("pan needs stereo input, got {} channel(s)", buffer.channels()),
        ));
    }
    if !position.is_finite() || !(-1.0..=1.0).contains(&position) {
        return Err(MurmurError::invalid(
            "pan_position",
            format!("{} is outside [-1, 1]", position),
        ));
    }

    let left_gain = 1.0 - position.max(0.0);
    let right_gain = 1.0 - (-position).max(0.0);

    for (channel, channel_gain) in [(0, left_gain), (1, right_gain)] {
        if channel_gain != 1.0 {
            for sample in buffer.channel_mut(channel) {
                *sample *= channel_gain;
            }
        }
    }
    Ok(buffer)
}

/// Reinterpret the samples at `sample_rate * factor`
///
/// The sample data is untouched; only the rate tag changes, so pitch and
/// duration shift together (duration scales by `1/factor`). The new rate is
/// truncated to whole hertz and must fit the `u32` rate tag.
pub fn resample_rate(mut buffer: AudioBuffer, factor: f64) -> Result<AudioBuffer> {
    if factor == 1.0 {
        return Ok(buffer);
    }

    let new_rate = scaled_rate(buffer.sample_rate, factor)?;
    buffer.sample_rate = u32::try_from(new_rate).map_err(|_| {
        MurmurError::invalid(
            "factor",
            format!(
                "factor {} takes {} Hz to {} Hz, above the largest sample rate",
                factor, buffer.sample_rate, new_rate
            ),
        )
    })?;
    Ok(buffer)
}

/// Speed change: reinterpret at `sample_rate * factor`, then convert back
///
/// The result carries the original sample rate tag and lasts `1/factor` of
/// the input, up to the whole-hertz truncation of the intermediate rate.
/// The intermediate rate never becomes a buffer tag, so any positive factor
/// is accepted as long as it does not truncate to 0 Hz.
pub fn resample_rate_then_retime(buffer: AudioBuffer, factor: f64) -> Result<AudioBuffer> {
    if factor == 1.0 {
        return Ok(buffer);
    }

    let original_rate = buffer.sample_rate;
    let shifted_rate = scaled_rate(original_rate, factor)?;
    debug!(
        "Retiming {} frames: {} Hz read as {} Hz",
        buffer.num_frames(),
        original_rate,
        shifted_rate
    );

    let samples = buffer
        .samples
        .iter()
        .map(|channel| resample_linear(channel, shifted_rate, original_rate as u64))
        .collect();
    Ok(AudioBuffer {
        samples,
        sample_rate: original_rate,
    })
}

/// `sample_rate * factor`, truncated to whole hertz
fn scaled_rate(sample_rate: u32, factor: f64) -> Result<u64> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(MurmurError::invalid(
            "factor",
            format!("rate factor must be positive, got {}", factor),
        ));
    }

    let scaled = (sample_rate as f64 * factor).floor();
    if scaled < 1.0 {
        return Err(MurmurError::invalid(
            "factor",
            format!("factor {} takes {} Hz below 1 Hz", factor, sample_rate),
        ));
    }
    if scaled >= u64::MAX as f64 {
        return Err(MurmurError::invalid(
            "factor",
            format!("factor {} is too large", factor),
        ));
    }
    Ok(scaled as u64)
}

/// Concatenate `n` copies of the buffer
pub fn repeat(buffer: AudioBuffer, n: usize) -> Result<AudioBuffer> {
    if n == 0 {
        return Err(MurmurError::invalid("repetitions", "must be at least 1"));
    }
    if n == 1 {
        return Ok(buffer);
    }

    let samples = buffer
        .samples
        .iter()
        .map(|channel| channel.repeat(n))
        .collect();
    Ok(AudioBuffer {
        samples,
        sample_rate: buffer.sample_rate,
    })
}

/// Zero-filled buffer lasting `duration_ms`
pub fn silent(duration_ms: f64, sample_rate: u32, channel_count: usize) -> Result<AudioBuffer> {
    if sample_rate == 0 {
        return Err(MurmurError::invalid("sample_rate", "must be positive"));
    }
    if !duration_ms.is_finite() || duration_ms < 0.0 {
        return Err(MurmurError::invalid(
            "duration_ms",
            format!("{} is not a valid duration", duration_ms),
        ));
    }
    let layout = ChannelLayout::from_count(channel_count).ok_or_else(|| {
        MurmurError::invalid(
            "channel_count",
            format!("{} (only 1 or 2 supported)", channel_count),
        )
    })?;

    Ok(AudioBuffer::new(
        ms_to_frames(duration_ms, sample_rate),
        layout,
        sample_rate,
    ))
}

/// Duplicate a mono buffer into both stereo channels; stereo passes through
pub fn to_stereo(mut buffer: AudioBuffer) -> AudioBuffer {
    if buffer.channels() == 1 {
        let mono = buffer.samples[0].clone();
        buffer.samples.push(mono);
    }
    buffer
}

/// Conform a buffer to `channel_count` channels
///
/// Mono is duplicated up to stereo; stereo is averaged down to mono.
pub fn convert_channels(buffer: AudioBuffer, channel_count: usize) -> Result<AudioBuffer> {
    match (buffer.channels(), channel_count) {
        (from, to) if from == to => Ok(buffer),
        (1, 2) => Ok(to_stereo(buffer)),
        (2, 1) => {
            let mono = buffer.samples[0]
                .iter()
                .zip(&buffer.samples[1])
                .map(|(l, r)| (l + r) * 0.5)
                .collect();
            Ok(AudioBuffer {
                samples: vec![mono],
                sample_rate: buffer.sample_rate,
            })
        }
        (from, to) => Err(MurmurError::UnsupportedFormat {
            format: format!("{}-to-{} channel conversion", from, to),
        }),
    }
}

/// Convert a buffer to `target_rate` with linear interpolation
///
/// Unlike [`resample_rate`] this changes the sample data so that playback
/// duration and pitch are preserved.
pub fn convert_rate(buffer: AudioBuffer, target_rate: u32) -> AudioBuffer {
    if buffer.sample_rate == target_rate || buffer.sample_rate == 0 || target_rate == 0 {
        return buffer;
    }

    debug!(
        "Converting {} frames from {} Hz to {} Hz",
        buffer.num_frames(),
        buffer.sample_rate,
        target_rate
    );

    let samples = buffer
        .samples
        .iter()
        .map(|channel| {
            resample_linear(channel, buffer.sample_rate as u64, target_rate as u64)
        })
        .collect();
    AudioBuffer {
        samples,
        sample_rate: target_rate,
    }
}

/// Frames `frames` becomes when converted from `from_rate` to `to_rate`
///
/// `ceil(frames * to_rate / from_rate)`, computed exactly.
pub fn converted_frames(frames: usize, from_rate: u64, to_rate: u64) -> usize {
    if from_rate == 0 || from_rate == to_rate {
        return frames;
    }
    let scaled = frames as u128 * to_rate as u128;
    scaled.div_ceil(from_rate as u128).min(usize::MAX as u128) as usize
}

/// Linear interpolation resampling
///
/// Output length is [`converted_frames`] of the input length.
// TODO: a windowed-sinc kernel would avoid the aliasing linear interpolation
// introduces when downsampling pitch-shifted voices.
fn resample_linear(samples: &[f32], from_rate: u64, to_rate: u64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = converted_frames(source_len, from_rate, to_rate);
    let step = from_rate as f64 / to_rate as f64;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        // Map output index to source position
        let src_pos = i as f64 * step;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::{generate_stereo_test_tone, generate_test_tone};
    use approx::assert_relative_eq;

    const RATE: u32 = 8000;

    fn ramp(frames: usize) -> AudioBuffer {
        let left: Vec<f32> = (0..frames).map(|i| i as f32 / frames as f32).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        AudioBuffer::from_channels(vec![left, right], RATE).unwrap()
    }

    #[test]
    fn test_gain_scales_samples() {
        let buffer = AudioBuffer::from_channels(vec![vec![0.5; 10]], RATE).unwrap();
        let quieter = gain(buffer, -6.0206);
        for &s in quieter.channel(0) {
            assert_relative_eq!(s, 0.25, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_gain_round_trip() {
        let original = generate_stereo_test_tone(440.0, 660.0, 0.1, RATE);
        for db in [-36.0_f32, -15.0, -5.0, 3.0, 12.0] {
            let back = gain(gain(original.clone(), db), -db);
            assert!(back.approx_eq(&original, 1e-5), "round trip failed for {} dB", db);
        }
    }

    #[test]
    fn test_gain_does_not_clamp() {
        let buffer = AudioBuffer::from_channels(vec![vec![0.8]], RATE).unwrap();
        let boosted = gain(buffer, 12.0);
        assert!(boosted.channel(0)[0] > 3.0);
    }

    #[test]
    fn test_pan_centre_is_noop() {
        let original = ramp(100);
        let panned = pan(original.clone(), 0.0).unwrap();
        assert_eq!(panned, original);
    }

    #[test]
    fn test_pan_hard_sides_silence_opposite_channel() {
        let hard_left = pan(ramp(100), -1.0).unwrap();
        assert!(hard_left.channel(1).iter().all(|&s| s == 0.0));
        assert_eq!(hard_left.channel(0), ramp(100).channel(0));

        let hard_right = pan(ramp(100), 1.0).unwrap();
        assert!(hard_right.channel(0).iter().all(|&s| s == 0.0));
        assert_eq!(hard_right.channel(1), ramp(100).channel(1));
    }

    #[test]
    fn test_pan_is_symmetric_and_monotonic() {
        let ones = AudioBuffer::from_channels(vec![vec![1.0], vec![1.0]], RATE).unwrap();
        let mut last_left = f32::INFINITY;
        for step in 0..=10 {
            let position = step as f32 / 10.0;
            let right_side = pan(ones.clone(), position).unwrap();
            let left_side = pan(ones.clone(), -position).unwrap();

            assert_relative_eq!(right_side.channel(0)[0], left_side.channel(1)[0]);
            assert!(right_side.channel(0)[0] <= last_left);
            last_left = right_side.channel(0)[0];
        }
    }

    #[test]
    fn test_pan_rejects_mono_and_out_of_range() {
        let mono = generate_test_tone(440.0, 0.01, RATE);
        assert!(matches!(
            pan(mono, 0.5),
            Err(MurmurError::InvalidParameter { name: "buffer", .. })
        ));
        assert!(pan(ramp(10), 1.5).is_err());
        assert!(pan(ramp(10), f32::NAN).is_err());
    }

    #[test]
    fn test_resample_rate_unity_is_identity() {
        let original = ramp(64);
        assert_eq!(resample_rate(original.clone(), 1.0).unwrap(), original);
    }

    #[test]
    fn test_resample_rate_retags_without_touching_samples() {
        let original = ramp(800);
        let shifted = resample_rate(original.clone(), 1.25).unwrap();

        assert_eq!(shifted.sample_rate, 10000);
        assert_eq!(shifted.samples, original.samples);
        assert_relative_eq!(shifted.duration_ms(), original.duration_ms() / 1.25);
    }

    #[test]
    fn test_resample_rate_rejects_bad_factor() {
        assert!(resample_rate(ramp(8), 0.0).is_err());
        assert!(resample_rate(ramp(8), -2.0).is_err());
        assert!(resample_rate(ramp(8), f64::NAN).is_err());
        // 8000 Hz * 1e-5 truncates to 0 Hz
        assert!(resample_rate(ramp(8), 1e-5).is_err());
    }

    #[test]
    fn test_resample_rate_rejects_tag_overflow() {
        let long = AudioBuffer::new(10, ChannelLayout::Mono, 48_000);
        // 48 kHz * 100000 is 4.8 GHz, beyond a u32 rate tag
        assert!(matches!(
            resample_rate(long, 100_000.0),
            Err(MurmurError::InvalidParameter { name: "factor", .. })
        ));
    }

    #[test]
    fn test_retime_with_huge_factor_keeps_exact_length() {
        let long = AudioBuffer::new(100 * 48_000, ChannelLayout::Mono, 48_000);
        let squeezed = resample_rate_then_retime(long, 100_000.0).unwrap();

        assert_eq!(squeezed.sample_rate, 48_000);
        assert_eq!(squeezed.num_frames(), 48);
    }

    #[test]
    fn test_retime_fractional_factor_rounds_up_slightly() {
        // 25s read at 24000 * 25/9 Hz truncates to 66666 Hz
        let affs = AudioBuffer::new(25 * 24_000, ChannelLayout::Mono, 24_000);
        let squeezed = resample_rate_then_retime(affs, 25.0 / 9.0).unwrap();
        assert_eq!(squeezed.num_frames(), 216_003);
    }

    #[test]
    fn test_converted_frames_is_exact_ceiling() {
        assert_eq!(converted_frames(32_000, 32_000, 8000), 8000);
        assert_eq!(converted_frames(3, 2, 1), 2);
        assert_eq!(converted_frames(4_800_000, 4_800_000_000, 48_000), 48);
        assert_eq!(converted_frames(7, 0, 8000), 7);
    }

    #[test]
    fn test_resample_rate_then_retime_changes_duration_only() {
        let original = ramp(RATE as usize * 4);
        let faster = resample_rate_then_retime(original.clone(), 4.0).unwrap();

        assert_eq!(faster.sample_rate, RATE);
        assert_eq!(faster.num_frames(), RATE as usize);
        assert_relative_eq!(faster.duration_ms(), original.duration_ms() / 4.0);
        // Every fourth input frame survives unchanged
        assert_relative_eq!(faster.channel(0)[10], original.channel(0)[40]);
    }

    #[test]
    fn test_repeat() {
        let original = ramp(100);
        assert_eq!(repeat(original.clone(), 1).unwrap(), original);

        let tripled = repeat(original.clone(), 3).unwrap();
        assert_eq!(tripled.num_frames(), 300);
        assert_eq!(tripled.duration_ms(), 3.0 * original.duration_ms());
        assert_eq!(&tripled.channel(1)[200..], original.channel(1));

        assert!(repeat(original, 0).is_err());
    }

    #[test]
    fn test_silent() {
        let canvas = silent(2500.0, RATE, 2).unwrap();
        assert_eq!(canvas.num_frames(), 20000);
        assert_eq!(canvas.channels(), 2);
        assert_eq!(canvas.duration_ms(), 2500.0);
        assert!(canvas.is_silent());

        assert!(silent(100.0, 0, 2).is_err());
        assert!(silent(100.0, RATE, 3).is_err());
        assert!(silent(-1.0, RATE, 1).is_err());
    }

    #[test]
    fn test_convert_channels() {
        let mono = generate_test_tone(440.0, 0.01, RATE);
        let stereo = convert_channels(mono.clone(), 2).unwrap();
        assert_eq!(stereo.channel(0), mono.channel(0));
        assert_eq!(stereo.channel(1), mono.channel(0));

        let down = convert_channels(ramp(10), 1).unwrap();
        assert!(down.channel(0).iter().all(|&s| s.abs() < 1e-7));
    }

    #[test]
    fn test_convert_rate_preserves_duration() {
        let original = generate_test_tone(200.0, 1.0, RATE);
        let up = convert_rate(original.clone(), 16000);

        assert_eq!(up.sample_rate, 16000);
        assert_eq!(up.num_frames(), 16000);
        // Midpoints are interpolated
        let expected = 0.5 * (original.channel(0)[10] + original.channel(0)[11]);
        assert_relative_eq!(up.channel(0)[21], expected, epsilon = 1e-6);
    }

    #[test]
    fn test_resample_linear_downsample() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
        let resampled = resample_linear(&samples, 2, 1);
        assert_eq!(resampled, vec![0.0, 1.0, 0.0, -1.0]);
    }
}
