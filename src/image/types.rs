//! Core types for image generation.

use crate::error::{CreativeFlowError, Result};
use crate::media::AspectRatio;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageModel {
    /// Gemini 2.5 Flash Image (fast, economical).
    #[default]
    Flash,
    /// Gemini 3 Pro Image (highest quality).
    Pro,
}

impl ImageModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
        }
    }

    /// Output size hint sent with the request. Only the pro model accepts one.
    pub fn image_size(&self) -> Option<&'static str> {
        match self {
            Self::Flash => None,
            Self::Pro => Some("1K"),
        }
    }
}

impl std::fmt::Display for ImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to generate an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Aspect ratio of the output.
    pub aspect_ratio: AspectRatio,
    /// Use the pro model instead of the configured default.
    pub high_quality: bool,
}

impl ImageRequest {
    /// Creates a new square, default-quality request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::Square,
            high_quality: false,
        }
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Selects the high quality model.
    pub fn with_high_quality(mut self, high_quality: bool) -> Self {
        self.high_quality = high_quality;
        self
    }
}

/// An image returned inline by the API.
#[derive(Debug, Clone)]
#[must_use = "generated image should be recorded or saved"]
pub struct GeneratedImage {
    /// MIME type declared by the response part.
    pub mime_type: String,
    /// Base64 payload exactly as returned.
    pub data: String,
    /// Model that produced the image.
    pub model: ImageModel,
}

impl GeneratedImage {
    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decodes the payload to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| CreativeFlowError::Decode(e.to_string()))
    }
}
