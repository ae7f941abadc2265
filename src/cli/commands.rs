//! CLI Command Implementations
//!
//! Glue between parsed arguments and the synthesis pipelines: load inputs,
//! merge config, run, export.

use std::path::{Path, PathBuf};

use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{BabbleArgs, SubliminalArgs};
use crate::config::{BabbleConfig, Config, SubliminalConfig};
use crate::engine::buffer::AudioBuffer;
use crate::engine::io::{
    export_audio, import_audio, probe_duration, resolve_output_path, ExportFormat,
};
use crate::error::{MurmurError, Result, StageContext};
use crate::synth::{generate_babble, generate_subliminal};
use crate::tts::CommandSynthesizer;

/// Load the config file if one was given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            Config::from_json_file(path).stage("load config")
        }
        None => Ok(Config::default()),
    }
}

/// Apply command-line overrides on top of a babble config
pub fn babble_config(base: BabbleConfig, args: &BabbleArgs) -> BabbleConfig {
    BabbleConfig {
        num_voices: args.voices.unwrap_or(base.num_voices),
        max_delay_ms: args.delay.unwrap_or(base.max_delay_ms),
        min_volume_reduction_db: args.min_vol.unwrap_or(base.min_volume_reduction_db),
        max_volume_reduction_db: args.max_vol.unwrap_or(base.max_volume_reduction_db),
        pitch_variation: args.pitch.unwrap_or(base.pitch_variation),
        seed: args.seed.or(base.seed),
    }
}

/// Apply command-line overrides on top of a subliminal config
pub fn subliminal_config(base: SubliminalConfig, args: &SubliminalArgs) -> SubliminalConfig {
    SubliminalConfig {
        repetitions: args.repetitions.unwrap_or(base.repetitions),
        language: args.language.clone().unwrap_or(base.language),
        ..base
    }
}

/// Generate a babble track and export it.
pub fn babble(args: &BabbleArgs, config: BabbleConfig) -> Result<PathBuf> {
    let config = babble_config(config, args);
    config.validate()?;

    // Resolve the output first so an unsupported extension fails before any work
    let (output_path, _) = resolve_output_path(&args.output_file).stage("resolve output")?;

    info!("Loading source audio from: {}", args.input_file.display());
    let source = import_audio(&args.input_file).stage("decode source")?;
    cross_check_duration(&args.input_file, &source);

    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Babble seed: {} (pass --seed {} to reproduce)", seed, seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let crowd = generate_babble(&source, &config, &mut rng).stage("generate babble")?;

    info!("Exporting final audio to: {}", output_path.display());
    export_audio(&crowd, &output_path, &ExportFormat::default()).stage("export")?;

    Ok(output_path)
}

/// Generate a subliminal track and export it to `<out_dir>/<title>.wav`.
pub fn subliminal(args: &SubliminalArgs, config: SubliminalConfig) -> Result<PathBuf> {
    let config = subliminal_config(config, args);
    config.validate()?;

    let title = args.title.trim();
    if title.is_empty() || title.contains(['/', '\\']) {
        return Err(MurmurError::invalid(
            "title",
            format!("'{}' cannot be used as a file name", args.title),
        ));
    }

    if let Some(img) = &args.img {
        warn!(
            "Video output is not supported; ignoring image {}",
            img.display()
        );
    }

    let affirmations = read_affirmations(&args.affs).stage("read affirmations")?;

    info!("Loading background audio from: {}", args.bg.display());
    let background = import_audio(&args.bg).stage("decode background")?;
    cross_check_duration(&args.bg, &background);

    let synthesizer = CommandSynthesizer::with_program(args.tts_program.as_str());
    let combined = generate_subliminal(&affirmations, background, &synthesizer, &config)?;

    std::fs::create_dir_all(&args.out_dir)
        .map_err(MurmurError::from)
        .stage("create output directory")?;
    let output_path = args.out_dir.join(format!("{}.wav", title));

    export_audio(&combined, &output_path, &ExportFormat::default()).stage("export")?;
    info!("Subliminal audio created: {}", output_path.display());

    Ok(output_path)
}

fn read_affirmations(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MurmurError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => MurmurError::Io(e),
    })
}

/// Compare the header-reported duration with the decoded buffer's
///
/// A disagreement larger than one frame is logged and returned in ms; it
/// never stops the run.
fn cross_check_duration(path: &Path, buffer: &AudioBuffer) -> Option<f64> {
    match probe_duration(path) {
        Ok(probed) => {
            let frame_ms = 1000.0 / buffer.sample_rate.max(1) as f64;
            let drift = probed - buffer.duration_ms();
            if drift.abs() > frame_ms {
                warn!(
                    "{}: header says {:.1} ms but {:.1} ms decoded",
                    path.display(),
                    probed,
                    buffer.duration_ms()
                );
                return Some(drift);
            }
            None
        }
        Err(e) => {
            warn!("Could not probe {}: {}", path.display(), e);
            None
        }
    }
}
