//! Session controller driven by the presentation layer.
//!
//! A [`Studio`] owns the providers, the auth gate and its state, and the
//! session history. Every method takes `&self`, so several generations can be
//! in flight at once; each records its own item when it finishes.

use crate::auth::{AuthGate, AuthState};
use crate::config::ClientConfig;
use crate::error::{CreativeFlowError, Result};
use crate::history::SessionHistory;
use crate::image::providers::GeminiImageProvider;
use crate::image::{ImageProvider, ImageRequest};
use crate::media::{AspectRatio, GeneratedItem, Locator, MediaKind};
use crate::video::providers::VeoProvider;
use crate::video::{VideoProvider, VideoRequest};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// One user's generation session.
pub struct Studio {
    image: Arc<dyn ImageProvider>,
    video: Arc<dyn VideoProvider>,
    auth: AuthGate,
    auth_state: Mutex<AuthState>,
    history: Mutex<SessionHistory>,
    http: reqwest::Client,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("image", &self.image.name())
            .field("video", &self.video.name())
            .field("auth", &self.auth)
            .field("auth_state", &self.auth_state())
            .field("history_len", &lock(&self.history).len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Studio {
    /// Creates a studio from explicit providers.
    pub fn new(
        image: Arc<dyn ImageProvider>,
        video: Arc<dyn VideoProvider>,
        auth: AuthGate,
    ) -> Self {
        Self {
            image,
            video,
            auth,
            auth_state: Mutex::new(AuthState::Unknown),
            history: Mutex::new(SessionHistory::new()),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a studio backed by Gemini and Veo, sharing one HTTP client.
    pub fn from_config(config: ClientConfig, auth: AuthGate) -> Self {
        let http = reqwest::Client::new();
        let config = Arc::new(config);
        Self {
            image: Arc::new(GeminiImageProvider::with_client(
                http.clone(),
                Arc::clone(&config),
            )),
            video: Arc::new(VeoProvider::with_client(http.clone(), config)),
            auth,
            auth_state: Mutex::new(AuthState::Unknown),
            history: Mutex::new(SessionHistory::new()),
            http,
        }
    }

    /// Current authentication state.
    pub fn auth_state(&self) -> AuthState {
        *lock(&self.auth_state)
    }

    fn set_auth_state(&self, state: AuthState) {
        let mut current = lock(&self.auth_state);
        if *current != state {
            tracing::debug!(from = ?*current, to = ?state, "auth state changed");
        }
        *current = state;
    }

    /// Re-derives the auth state from the host.
    pub async fn refresh_auth(&self) -> AuthState {
        let state = if self.auth.check_authenticated().await {
            AuthState::Confirmed
        } else {
            AuthState::Unauthenticated
        };
        self.set_auth_state(state);
        state
    }

    /// Opens the host key-selection flow, then asks the host once whether a
    /// key is now selected.
    ///
    /// The host gives no completion signal, so a negative answer leaves the
    /// state at [`AuthState::PendingConfirmation`], which still allows video.
    pub async fn connect(&self) -> Result<AuthState> {
        self.auth.request_authentication().await?;
        self.set_auth_state(AuthState::PendingConfirmation);

        if self.auth.check_authenticated().await {
            self.set_auth_state(AuthState::Confirmed);
        }
        Ok(self.auth_state())
    }

    /// Generates an image and records it.
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        high_quality: bool,
    ) -> Result<GeneratedItem> {
        validate_prompt(prompt)?;
        let request = ImageRequest::new(prompt)
            .with_aspect_ratio(aspect_ratio)
            .with_high_quality(high_quality);

        let image = self.image.generate(&request).await?;
        let item = GeneratedItem::new(
            MediaKind::Image,
            Locator::Data(image.to_data_url()),
            prompt,
            Some(aspect_ratio),
        );
        lock(&self.history).record(item.clone());
        Ok(item)
    }

    /// Generates a video and records it.
    ///
    /// Requires an auth state that allows video. If the remote rejects the
    /// selected key the state drops to [`AuthState::Unauthenticated`].
    pub async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        cancel: &CancellationToken,
    ) -> Result<GeneratedItem> {
        if !self.auth_state().allows_video() {
            return Err(CreativeFlowError::AuthRequired);
        }
        validate_prompt(prompt)?;
        let request = VideoRequest::new(prompt).with_aspect_ratio(aspect_ratio);
        request.validate()?;

        let video = match self.video.generate(&request, cancel).await {
            Ok(video) => video,
            Err(e) => {
                if e.invalidates_auth() {
                    tracing::warn!("selected API key was rejected, re-selection required");
                    self.set_auth_state(AuthState::Unauthenticated);
                }
                return Err(e);
            }
        };

        let item = GeneratedItem::new(
            MediaKind::Video,
            Locator::Authorized(video.authorized_uri),
            prompt,
            Some(aspect_ratio),
        );
        lock(&self.history).record(item.clone());
        Ok(item)
    }

    /// Snapshot of the history, newest first.
    pub fn history(&self) -> Vec<GeneratedItem> {
        lock(&self.history).to_vec()
    }

    /// Number of recorded items.
    pub fn history_len(&self) -> usize {
        lock(&self.history).len()
    }

    /// Empties the history. Callers confirm with the user first.
    pub fn clear_history(&self) {
        lock(&self.history).clear();
    }

    /// Loads the bytes behind an item.
    pub async fn download(&self, item: &GeneratedItem) -> Result<Vec<u8>> {
        match &item.locator {
            Locator::Data(_) => item.locator.decode_inline(),
            Locator::Authorized(url) => {
                let response = self.http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CreativeFlowError::Api {
                        status: status.as_u16(),
                        message: "Failed to download video".into(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Rejects prompts that are empty after trimming. The prompt itself is sent
/// and recorded as typed.
fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(CreativeFlowError::InvalidArgument(
            "prompt must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_prompt() {
        assert!(validate_prompt("  a red cube \n").is_ok());
        assert!(matches!(
            validate_prompt("   "),
            Err(CreativeFlowError::InvalidArgument(_))
        ));
    }
}
