//! Video generation module.

mod poll;
mod provider;
pub mod providers;
mod types;

pub use provider::VideoProvider;
pub use types::{GeneratedVideo, VeoModel, VideoRequest, VideoResolution};
