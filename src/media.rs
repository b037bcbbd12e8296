//! Media types shared by the image and video paths and the session history.

use crate::error::{redact_key_params, CreativeFlowError, Result};
use base64::Engine;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Aspect ratios accepted by the generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AspectRatio {
    /// 1:1 square aspect ratio.
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 landscape (widescreen) aspect ratio.
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait (tall) aspect ratio.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// All supported ratios.
    pub const ALL: [AspectRatio; 3] = [Self::Square, Self::Landscape, Self::Portrait];

    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    /// Returns true if Veo accepts this ratio.
    pub fn supports_video(&self) -> bool {
        matches!(self, Self::Landscape | Self::Portrait)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = CreativeFlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1:1" => Ok(Self::Square),
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            other => Err(CreativeFlowError::InvalidArgument(format!(
                "unsupported aspect ratio '{other}' (expected one of 1:1, 16:9, 9:16)"
            ))),
        }
    }
}

/// Kind of generated media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

impl MediaKind {
    /// File extension used when downloading this kind of media.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Video => "mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Where a generated item can be loaded from.
///
/// `Authorized` URLs carry the API key in their query string. `Debug`,
/// `Display` and `Serialize` all redact it; only [`Locator::expose`] returns
/// the usable value.
#[derive(Clone, PartialEq, Eq)]
pub enum Locator {
    /// `data:<mime>;base64,<payload>` URI.
    Data(String),
    /// Remote URL with the credential appended as `key=`.
    Authorized(String),
}

impl Locator {
    /// Returns the full locator, credential included.
    pub fn expose(&self) -> &str {
        match self {
            Self::Data(uri) | Self::Authorized(uri) => uri,
        }
    }

    /// Returns a form safe to log or display.
    pub fn redacted(&self) -> String {
        match self {
            Self::Data(uri) => {
                let header = uri.split_once(',').map_or(uri.as_str(), |(h, _)| h);
                format!("{header},...")
            }
            Self::Authorized(url) => redact_key_params(url),
        }
    }

    /// Returns true if the locator embeds a credential.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    /// MIME type declared by a data URI.
    pub fn mime_type(&self) -> Option<&str> {
        let Self::Data(uri) = self else {
            return None;
        };
        let header = uri.strip_prefix("data:")?.split_once(',')?.0;
        header.strip_suffix(";base64")
    }

    /// Decodes the payload of a data URI.
    pub fn decode_inline(&self) -> Result<Vec<u8>> {
        let Self::Data(uri) = self else {
            return Err(CreativeFlowError::InvalidArgument(
                "locator is a remote URL, not inline data".into(),
            ));
        };
        let (_, payload) = uri
            .split_once(";base64,")
            .ok_or_else(|| CreativeFlowError::Decode("not a base64 data URI".into()))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| CreativeFlowError::Decode(e.to_string()))
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(_) => write!(f, "Data({})", self.redacted()),
            Self::Authorized(_) => write!(f, "Authorized({})", self.redacted()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.redacted())
    }
}

/// One completed generation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedItem {
    /// Unique within the session.
    pub id: Uuid,
    /// Image or video.
    pub media_kind: MediaKind,
    /// Where to load the media from.
    pub locator: Locator,
    /// The prompt the item was generated from.
    pub prompt: String,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Layout hint.
    pub aspect_ratio: Option<AspectRatio>,
}

impl GeneratedItem {
    /// Creates an item stamped with a fresh id and the current time.
    pub fn new(
        media_kind: MediaKind,
        locator: Locator,
        prompt: impl Into<String>,
        aspect_ratio: Option<AspectRatio>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_kind,
            locator,
            prompt: prompt.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
            aspect_ratio,
        }
    }

    /// File name offered when the item is downloaded.
    pub fn download_file_name(&self) -> String {
        format!("creative-flow-{}.{}", self.id, self.media_kind.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("1:1".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
        assert_eq!(" 9:16 ".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
    }

    #[test]
    fn test_aspect_ratio_rejects_unknown() {
        let err = "4:3".parse::<AspectRatio>().unwrap_err();
        assert!(matches!(err, CreativeFlowError::InvalidArgument(_)));
        assert!(err.to_string().contains("4:3"));
    }

    #[test]
    fn test_aspect_ratio_video_support() {
        assert!(!AspectRatio::Square.supports_video());
        assert!(AspectRatio::Landscape.supports_video());
        assert!(AspectRatio::Portrait.supports_video());
    }

    #[test]
    fn test_data_locator_mime_and_decode() {
        let locator = Locator::Data("data:image/png;base64,aGVsbG8=".into());
        assert_eq!(locator.mime_type(), Some("image/png"));
        assert_eq!(locator.decode_inline().unwrap(), b"hello");
        assert!(!locator.is_sensitive());
    }

    #[test]
    fn test_authorized_locator_is_redacted() {
        let locator = Locator::Authorized(
            "https://example.com/files/abc:download?alt=media&key=secret-key".into(),
        );
        assert!(locator.is_sensitive());
        assert!(!format!("{locator:?}").contains("secret-key"));
        assert!(!locator.to_string().contains("secret-key"));
        assert!(locator.expose().ends_with("key=secret-key"));
        assert!(locator.decode_inline().is_err());
    }

    #[test]
    fn test_item_serialization_redacts_locator() {
        let item = GeneratedItem::new(
            MediaKind::Video,
            Locator::Authorized("https://example.com/v.mp4?key=secret-key".into()),
            "a cat",
            Some(AspectRatio::Landscape),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["media_kind"], "VIDEO");
        assert_eq!(json["aspect_ratio"], "16:9");
        assert_eq!(json["locator"], "https://example.com/v.mp4?key=REDACTED");
    }

    #[test]
    fn test_download_file_name() {
        let image = GeneratedItem::new(
            MediaKind::Image,
            Locator::Data("data:image/png;base64,AA==".into()),
            "cube",
            None,
        );
        assert_eq!(
            image.download_file_name(),
            format!("creative-flow-{}.png", image.id)
        );

        let video = GeneratedItem::new(
            MediaKind::Video,
            Locator::Authorized("https://example.com/v?key=k".into()),
            "cube",
            None,
        );
        assert!(video.download_file_name().ends_with(".mp4"));
    }

    #[test]
    fn test_item_ids_unique() {
        let locator = Locator::Data("data:image/png;base64,AA==".into());
        let a = GeneratedItem::new(MediaKind::Image, locator.clone(), "x", None);
        let b = GeneratedItem::new(MediaKind::Image, locator, "x", None);
        assert_ne!(a.id, b.id);
    }
}
