//! Core types for video generation.

use crate::error::{CreativeFlowError, Result};
use crate::media::AspectRatio;
use serde::{Deserialize, Serialize};

/// Veo model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VeoModel {
    /// Veo 3.1 Fast Preview.
    #[default]
    Veo31Fast,
    /// Veo 3.1 Preview.
    Veo31,
}

impl VeoModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo31Fast => "veo-3.1-fast-generate-preview",
            Self::Veo31 => "veo-3.1-generate-preview",
        }
    }
}

impl std::fmt::Display for VeoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution for generated video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoResolution {
    /// 1280x720.
    #[default]
    #[serde(rename = "720p")]
    P720,
    /// 1920x1080.
    #[serde(rename = "1080p")]
    P1080,
}

impl VideoResolution {
    /// Returns the resolution as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

impl std::fmt::Display for VideoResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to generate a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Aspect ratio (16:9 or 9:16).
    pub aspect_ratio: AspectRatio,
}

impl VideoRequest {
    /// Creates a new landscape request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::Landscape,
        }
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Rejects ratios Veo cannot render.
    pub fn validate(&self) -> Result<()> {
        if !self.aspect_ratio.supports_video() {
            return Err(CreativeFlowError::InvalidArgument(format!(
                "aspect ratio {} is not supported for video (use 16:9 or 9:16)",
                self.aspect_ratio
            )));
        }
        Ok(())
    }
}

/// A finished video, referenced by an authorized download URL.
#[derive(Clone)]
#[must_use = "generated video should be recorded or downloaded"]
pub struct GeneratedVideo {
    /// Download URL with the credential appended. Sensitive.
    pub authorized_uri: String,
    /// Model that produced the video.
    pub model: VeoModel,
    /// Name of the long-running operation.
    pub operation: String,
}

impl std::fmt::Debug for GeneratedVideo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedVideo")
            .field(
                "authorized_uri",
                &crate::error::redact_key_params(&self.authorized_uri),
            )
            .field("model", &self.model)
            .field("operation", &self.operation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_veo_model_as_str() {
        assert_eq!(VeoModel::Veo31Fast.as_str(), "veo-3.1-fast-generate-preview");
        assert_eq!(VeoModel::default(), VeoModel::Veo31Fast);
    }

    #[test]
    fn test_resolution_default() {
        assert_eq!(VideoResolution::default().as_str(), "720p");
    }

    #[test]
    fn test_square_rejected_for_video() {
        let req = VideoRequest::new("waves").with_aspect_ratio(AspectRatio::Square);
        assert!(matches!(
            req.validate(),
            Err(CreativeFlowError::InvalidArgument(_))
        ));
        assert!(VideoRequest::new("waves").validate().is_ok());
    }

    #[test]
    fn test_generated_video_debug_redacts_key() {
        let video = GeneratedVideo {
            authorized_uri: "https://example.com/v?alt=media&key=secret".into(),
            model: VeoModel::Veo31Fast,
            operation: "operations/1".into(),
        };
        assert!(!format!("{video:?}").contains("secret"));
    }
}
