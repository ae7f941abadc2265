//! Duration matching
//!
//! Brings an affirmation track close to a background track's length with a
//! single two-way decision: a shorter track is repeated a whole number of
//! times, a longer one is sped up uniformly. Repetition never pads with a
//! partial block, so the result can still fall short of the background.

use log::{debug, info};

use crate::dsp::transform::{repeat, resample_rate_then_retime};
use crate::engine::buffer::AudioBuffer;
use crate::error::{MurmurError, Result};

/// Durations closer than this are treated as equal
pub const DURATION_EPSILON_MS: f64 = 1e-6;

/// How the affirmation track will be adjusted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationPlan {
    /// Keep the track as is
    Unchanged,
    /// Concatenate `count` copies of the track
    Repeat { count: usize },
    /// Speed the track up by `factor` (duration becomes `1/factor`)
    SpeedUp { factor: f64 },
}

/// Decide how to match an affirmation track of `affs_ms` to `bg_ms`
///
/// Pure function of the two durations; both must be positive.
pub fn plan_match(affs_ms: f64, bg_ms: f64) -> Result<DurationPlan> {
    if !affs_ms.is_finite() || affs_ms <= 0.0 {
        return Err(MurmurError::invalid(
            "affirmations",
            format!("track must have a positive duration, got {} ms", affs_ms),
        ));
    }
    if !bg_ms.is_finite() || bg_ms <= 0.0 {
        return Err(MurmurError::invalid(
            "background",
            format!("track must have a positive duration, got {} ms", bg_ms),
        ));
    }

    if (affs_ms - bg_ms).abs() <= DURATION_EPSILON_MS {
        return Ok(DurationPlan::Unchanged);
    }

    if affs_ms < bg_ms {
        let count = (bg_ms / affs_ms).floor() as usize;
        if count > 1 {
            Ok(DurationPlan::Repeat { count })
        } else {
            Ok(DurationPlan::Unchanged)
        }
    } else {
        Ok(DurationPlan::SpeedUp {
            factor: affs_ms / bg_ms,
        })
    }
}

/// Adjust `affs` toward the duration of `bg`
pub fn match_duration(affs: AudioBuffer, bg: &AudioBuffer) -> Result<AudioBuffer> {
    let affs_ms = affs.duration_ms();
    let bg_ms = bg.duration_ms();
    info!(
        "Affirmations track length: {:.2}s | Background track length: {:.2}s",
        affs_ms / 1000.0,
        bg_ms / 1000.0
    );

    match plan_match(affs_ms, bg_ms)? {
        DurationPlan::Unchanged => {
            debug!("Affirmation track kept at its original length");
            Ok(affs)
        }
        DurationPlan::Repeat { count } => {
            info!("Repeating the full affirmations track {} times", count);
            repeat(affs, count)
        }
        DurationPlan::SpeedUp { factor } => {
            info!("Speeding up affirmations by a factor of {:.2}", factor);
            resample_rate_then_retime(affs, factor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::ChannelLayout;
    use approx::assert_relative_eq;
    use test_case::test_case;

    const RATE: u32 = 1000;

    fn seconds(secs: usize) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(secs * RATE as usize, ChannelLayout::Mono, RATE);
        for (i, s) in buffer.samples[0].iter_mut().enumerate() {
            *s = ((i % 50) as f32 - 25.0) / 50.0;
        }
        buffer
    }

    #[test_case(10_000.0, 35_000.0 => DurationPlan::Repeat { count: 3 }; "shorter repeats whole multiples")]
    #[test_case(10_000.0, 30_000.0 => DurationPlan::Repeat { count: 3 }; "exact multiple")]
    #[test_case(10_000.0, 15_000.0 => DurationPlan::Unchanged; "less than double is unchanged")]
    #[test_case(40_000.0, 10_000.0 => DurationPlan::SpeedUp { factor: 4.0 }; "longer speeds up")]
    #[test_case(12_345.0, 12_345.0 => DurationPlan::Unchanged; "equal")]
    #[test_case(12_345.0, 12_345.0 + 1e-9 => DurationPlan::Unchanged; "equal within epsilon")]
    fn test_plan(affs_ms: f64, bg_ms: f64) -> DurationPlan {
        plan_match(affs_ms, bg_ms).unwrap()
    }

    #[test]
    fn test_plan_rejects_empty_tracks() {
        assert!(plan_match(0.0, 10_000.0).is_err());
        assert!(plan_match(10_000.0, 0.0).is_err());
        assert!(plan_match(f64::NAN, 10_000.0).is_err());
    }

    #[test]
    fn test_match_repeats_to_thirty_seconds() {
        let matched = match_duration(seconds(10), &seconds(35)).unwrap();
        assert_eq!(matched.duration_ms(), 30_000.0);
        assert_eq!(matched.sample_rate, RATE);
    }

    #[test]
    fn test_match_speeds_up_to_background() {
        let affs = seconds(40);
        let matched = match_duration(affs.clone(), &seconds(10)).unwrap();

        assert_eq!(matched.sample_rate, RATE);
        assert_relative_eq!(matched.duration_ms(), 10_000.0);
        assert_relative_eq!(matched.channel(0)[7], affs.channel(0)[28]);
    }

    #[test]
    fn test_match_huge_ratio_lands_on_background_length() {
        // 100s of speech over a single millisecond of background
        let affs = AudioBuffer::new(100 * 48_000, ChannelLayout::Mono, 48_000);
        let bg = AudioBuffer::new(48, ChannelLayout::Stereo, 48_000);

        let matched = match_duration(affs, &bg).unwrap();
        assert_eq!(matched.num_frames(), bg.num_frames());
        assert_eq!(matched.duration_ms(), bg.duration_ms());
    }

    #[test]
    fn test_match_fractional_ratio_overshoots_by_few_frames() {
        // 25s into 9s: the 66666.67 Hz intermediate rate truncates to 66666 Hz
        let affs = AudioBuffer::new(25 * 24_000, ChannelLayout::Mono, 24_000);
        let bg = AudioBuffer::new(9 * 24_000, ChannelLayout::Stereo, 24_000);

        let matched = match_duration(affs, &bg).unwrap();
        assert_eq!(matched.sample_rate, 24_000);
        assert_eq!(matched.num_frames(), bg.num_frames() + 3);
    }

    #[test]
    fn test_match_equal_returns_input() {
        let affs = seconds(5);
        let matched = match_duration(affs.clone(), &seconds(5)).unwrap();
        assert_eq!(matched, affs);
    }

    #[test]
    fn test_match_compares_durations_across_rates() {
        // 2s at 1kHz against 6s at 4kHz
        let bg = AudioBuffer::new(24_000, ChannelLayout::Stereo, 4000);
        let matched = match_duration(seconds(2), &bg).unwrap();
        assert_eq!(matched.duration_ms(), 6000.0);
        assert_eq!(matched.sample_rate, RATE);
    }
}
