//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GeneratedImage, ImageRequest};
use async_trait::async_trait;

/// Trait for image generation providers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from the given request.
    ///
    /// Errors from the remote are returned as-is; nothing is retried.
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}
