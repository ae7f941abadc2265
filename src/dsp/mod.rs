//! Buffer transforms and mixing
//!
//! Every operation here takes buffers by value and returns a new buffer.

pub mod mixer;
pub mod transform;

pub use mixer::{overlay, overlay_with, OverlayMode};
pub use transform::{
    convert_channels, convert_rate, converted_frames, gain, pan, repeat, resample_rate,
    resample_rate_then_retime, silent, to_stereo,
};
