//! Synthesis configuration
//!
//! Settings for both pipelines, loadable from a JSON file. Every field has a
//! default, so a config file only needs the values it changes:
//!
//! ```json
//! { "babble": { "num_voices": 30, "seed": 7 }, "subliminal": { "repetitions": 4 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MurmurError, Result};

/// Upper bound on voices per babble run
pub const MAX_VOICES: usize = 1000;

/// Default attenuation applied to affirmations (dB of reduction)
pub const SUBLIMINAL_ATTENUATION_DB: f32 = 36.0;

/// Settings for the babbling-crowd effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BabbleConfig {
    /// Number of overlapping voices
    pub num_voices: usize,
    /// Maximum random start delay per voice
    pub max_delay_ms: u32,
    /// Reduction for the quietest voices (higher is quieter)
    pub min_volume_reduction_db: f32,
    /// Reduction for the loudest voices (lower is louder)
    pub max_volume_reduction_db: f32,
    /// Maximum pitch deviation, 0.08 means +/- 8%
    pub pitch_variation: f64,
    /// Fixed RNG seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for BabbleConfig {
    fn default() -> Self {
        Self {
            num_voices: 15,
            max_delay_ms: 2500,
            min_volume_reduction_db: 15.0,
            max_volume_reduction_db: 5.0,
            pitch_variation: 0.08,
            seed: None,
        }
    }
}

impl BabbleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_voices == 0 {
            return Err(MurmurError::invalid("num_voices", "must be at least 1"));
        }
        if self.num_voices > MAX_VOICES {
            return Err(MurmurError::invalid(
                "num_voices",
                format!("{} exceeds the limit of {}", self.num_voices, MAX_VOICES),
            ));
        }
        for (name, value) in [
            ("min_volume_reduction_db", self.min_volume_reduction_db),
            ("max_volume_reduction_db", self.max_volume_reduction_db),
        ] {
            if !value.is_finite() {
                return Err(MurmurError::invalid(name, format!("{} is not finite", value)));
            }
        }
        if !self.pitch_variation.is_finite() || !(0.0..1.0).contains(&self.pitch_variation) {
            return Err(MurmurError::invalid(
                "pitch_variation",
                format!("{} is outside [0, 1)", self.pitch_variation),
            ));
        }
        Ok(())
    }
}

/// Settings for subliminal track generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubliminalConfig {
    /// How many times the affirmation block is spoken per track
    pub repetitions: usize,
    /// Attenuation applied to the matched affirmation track
    pub attenuation_db: f32,
    /// Language code handed to the speech synthesizer
    pub language: String,
}

impl Default for SubliminalConfig {
    fn default() -> Self {
        Self {
            repetitions: 8,
            attenuation_db: SUBLIMINAL_ATTENUATION_DB,
            language: "en".to_string(),
        }
    }
}

impl SubliminalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            return Err(MurmurError::invalid("repetitions", "must be at least 1"));
        }
        if !self.attenuation_db.is_finite() || self.attenuation_db < 0.0 {
            return Err(MurmurError::invalid(
                "attenuation_db",
                format!("{} must be a non-negative reduction", self.attenuation_db),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(MurmurError::invalid("language", "must not be empty"));
        }
        Ok(())
    }
}

/// Top-level config file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub babble: BabbleConfig,
    pub subliminal: SubliminalConfig,
}

impl Config {
    /// Load a config file; missing sections and fields fall back to defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MurmurError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => MurmurError::Io(e),
        })?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.babble.validate().is_ok());
        assert!(config.subliminal.validate().is_ok());
        assert_eq!(config.babble.num_voices, 15);
        assert_eq!(config.babble.max_delay_ms, 2500);
        assert_eq!(config.subliminal.repetitions, 8);
        assert_eq!(config.subliminal.attenuation_db, 36.0);
    }

    #[test]
    fn test_babble_validation() {
        let zero = BabbleConfig {
            num_voices: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(MurmurError::InvalidParameter { name: "num_voices", .. })
        ));

        let crowd = BabbleConfig {
            num_voices: MAX_VOICES + 1,
            ..Default::default()
        };
        assert!(crowd.validate().is_err());

        let wobbly = BabbleConfig {
            pitch_variation: 1.0,
            ..Default::default()
        };
        assert!(wobbly.validate().is_err());

        // Reversed volume endpoints are accepted
        let reversed = BabbleConfig {
            min_volume_reduction_db: 2.0,
            max_volume_reduction_db: 20.0,
            ..Default::default()
        };
        assert!(reversed.validate().is_ok());
    }

    #[test]
    fn test_subliminal_validation() {
        let none = SubliminalConfig {
            repetitions: 0,
            ..Default::default()
        };
        assert!(none.validate().is_err());

        let boost = SubliminalConfig {
            attenuation_db: -6.0,
            ..Default::default()
        };
        assert!(boost.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("murmur.json");
        std::fs::write(
            &path,
            r#"{ "babble": { "num_voices": 30, "seed": 7 }, "subliminal": { "repetitions": 4 } }"#,
        )
        .unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.babble.num_voices, 30);
        assert_eq!(config.babble.seed, Some(7));
        assert_eq!(config.babble.max_delay_ms, 2500);
        assert_eq!(config.subliminal.repetitions, 4);
        assert_eq!(config.subliminal.language, "en");
    }

    #[test]
    fn test_empty_file_is_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();

        assert_eq!(Config::from_json_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        assert!(matches!(
            Config::from_json_file(Path::new("/nonexistent/murmur.json")),
            Err(MurmurError::FileNotFound { .. })
        ));

        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_json_file(&path),
            Err(MurmurError::Serialization(_))
        ));
    }
}
