#![warn(missing_docs)]
//! CreativeFlow - prompt-to-media generation with Gemini images and Veo video.
//!
//! The crate wraps two remote calls (inline image generation and
//! long-running video generation), tracks whether a usable API key is
//! selected, and keeps an in-memory, newest-first history of results.
//!
//! # Quick Start
//!
//! ```no_run
//! use creativeflow::{AspectRatio, AuthGate, ClientConfig, StaticKeyHost, Studio};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> creativeflow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let studio = Studio::from_config(config, AuthGate::new(Arc::new(StaticKeyHost::new(true))));
//!
//!     let image = studio.generate_image("A golden retriever puppy", AspectRatio::Square, false).await?;
//!     println!("{}", image.locator);
//!
//!     studio.refresh_auth().await;
//!     let video = studio
//!         .generate_video("Ocean waves at sunset", AspectRatio::Landscape, &CancellationToken::new())
//!         .await?;
//!     std::fs::write(video.download_file_name(), studio.download(&video).await?)?;
//!     Ok(())
//! }
//! ```

mod auth;
mod config;
mod error;
mod history;
mod media;
mod studio;

pub mod image;
pub mod video;

pub use auth::{AuthGate, AuthState, HostAuth, StaticKeyHost};
pub use config::{
    ApiKey, ClientConfig, ClientConfigBuilder, PollConfig, API_KEY_ENV_VARS, DEFAULT_BASE_URL,
};
pub use error::{CreativeFlowError, Result};
pub use history::SessionHistory;
pub use media::{AspectRatio, GeneratedItem, Locator, MediaKind};
pub use studio::Studio;

pub use image::providers::GeminiImageProvider;
pub use image::{GeneratedImage, ImageModel, ImageProvider, ImageRequest};
pub use video::providers::VeoProvider;
pub use video::{GeneratedVideo, VeoModel, VideoProvider, VideoRequest, VideoResolution};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::auth::{AuthGate, AuthState, HostAuth};
    pub use crate::config::ClientConfig;
    pub use crate::error::{CreativeFlowError, Result};
    pub use crate::image::{ImageProvider, ImageRequest};
    pub use crate::media::{AspectRatio, GeneratedItem, Locator, MediaKind};
    pub use crate::studio::Studio;
    pub use crate::video::{VideoProvider, VideoRequest};
}
