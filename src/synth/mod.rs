//! Synthesis pipelines
//!
//! - Babble: many varied copies of one clip mixed into a crowd
//! - Subliminal: quiet, duration-matched affirmations under a background

pub mod babble;
pub mod matcher;
pub mod subliminal;

pub use babble::{generate_babble, render_babble, VoiceParams};
pub use matcher::{match_duration, plan_match, DurationPlan};
pub use subliminal::{affirmation_text, generate_subliminal};
