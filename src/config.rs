//! Client configuration.

use crate::error::{CreativeFlowError, Result};
use crate::image::ImageModel;
use crate::video::{VeoModel, VideoResolution};
use std::fmt;
use std::time::Duration;

/// Default Gemini Developer API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted by [`ClientConfig::from_env`], in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GOOGLE_API_KEY"];

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key, rejecting blank values.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(CreativeFlowError::MissingCredential(
                "API key is empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the raw key for use in request headers and query strings.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(REDACTED)")
    }
}

/// Polling policy for long-running video operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between operation fetches.
    pub interval: Duration,
    /// Maximum number of fetches after submission. `None` means unbounded.
    pub max_attempts: Option<u32>,
    /// Overall deadline measured from submission. `None` means no deadline.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: Some(120),
            timeout: Some(Duration::from_secs(600)), // 10 minutes for video
        }
    }
}

/// Explicit configuration handed to the providers at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Credential sent with every request and appended to video URLs.
    pub credential: ApiKey,
    /// Image model used when high quality is not requested.
    pub image_model: ImageModel,
    /// Veo model for video generation.
    pub video_model: VeoModel,
    /// Resolution requested for generated video.
    pub video_resolution: VideoResolution,
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Video polling policy.
    pub poll: PollConfig,
}

impl ClientConfig {
    /// Creates a new `ClientConfigBuilder`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from `API_KEY` (or `GOOGLE_API_KEY`) with
    /// defaults for everything else.
    pub fn from_env() -> Result<Self> {
        ClientConfigBuilder::new().build_from_env()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    image_model: ImageModel,
    video_model: VeoModel,
    video_resolution: VideoResolution,
    base_url: Option<String>,
    poll: PollConfig,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the default image model.
    pub fn image_model(mut self, model: ImageModel) -> Self {
        self.image_model = model;
        self
    }

    /// Sets the Veo model variant.
    pub fn video_model(mut self, model: VeoModel) -> Self {
        self.video_model = model;
        self
    }

    /// Sets the video resolution.
    pub fn video_resolution(mut self, resolution: VideoResolution) -> Self {
        self.video_resolution = resolution;
        self
    }

    /// Overrides the API base URL (mock servers, proxies).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the delay between operation polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    /// Caps the number of operation polls.
    pub fn max_poll_attempts(mut self, attempts: Option<u32>) -> Self {
        self.poll.max_attempts = attempts;
        self
    }

    /// Sets the maximum time to wait for a video operation.
    pub fn poll_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.poll.timeout = timeout;
        self
    }

    /// Builds the configuration. The API key must have been set.
    pub fn build(self) -> Result<ClientConfig> {
        let key = self.api_key.clone().ok_or_else(|| {
            CreativeFlowError::MissingCredential("no API key provided".into())
        })?;
        self.finish(key)
    }

    /// Builds the configuration, falling back to the environment for the key.
    pub fn build_from_env(self) -> Result<ClientConfig> {
        let key = self
            .api_key
            .clone()
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            })
            .ok_or_else(|| {
                CreativeFlowError::MissingCredential(format!(
                    "{} not set and no API key provided",
                    API_KEY_ENV_VARS.join(" / ")
                ))
            })?;
        self.finish(key)
    }

    fn finish(self, key: String) -> Result<ClientConfig> {
        if self.poll.interval.is_zero() {
            return Err(CreativeFlowError::InvalidArgument(
                "poll interval must be greater than zero".into(),
            ));
        }
        if self.poll.max_attempts == Some(0) {
            return Err(CreativeFlowError::InvalidArgument(
                "max poll attempts must be at least 1".into(),
            ));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ClientConfig {
            credential: ApiKey::new(key)?,
            image_model: self.image_model,
            video_model: self.video_model,
            video_resolution: self.video_resolution,
            base_url,
            poll: self.poll,
        })
    }
}
