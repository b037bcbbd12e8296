//! Gate for video generation: asks the host whether an API key is selected.

use crate::error::{CreativeFlowError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Key-selection capability owned by the embedding host.
#[async_trait]
pub trait HostAuth: Send + Sync {
    /// Whether the user has already selected a key.
    async fn has_selected_api_key(&self) -> Result<bool>;

    /// Opens the host's key-selection flow. Returns once the flow was shown;
    /// it does not confirm that a key was committed.
    async fn open_select_key(&self) -> Result<()>;
}

/// Client-side authentication status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Not yet checked.
    #[default]
    Unknown,
    /// No usable key.
    Unauthenticated,
    /// Selection flow was opened but the host has not confirmed a key yet.
    PendingConfirmation,
    /// The host reports a selected key.
    Confirmed,
}

impl AuthState {
    /// Whether a video generation may be attempted in this state.
    pub fn allows_video(&self) -> bool {
        matches!(self, Self::PendingConfirmation | Self::Confirmed)
    }
}

/// Wraps an optional [`HostAuth`] capability.
#[derive(Clone, Default)]
pub struct AuthGate {
    host: Option<Arc<dyn HostAuth>>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("host_available", &self.host.is_some())
            .finish()
    }
}

impl AuthGate {
    /// Gate backed by a host capability.
    pub fn new(host: Arc<dyn HostAuth>) -> Self {
        Self { host: Some(host) }
    }

    /// Gate for environments without a key-selection capability.
    pub fn unavailable() -> Self {
        Self { host: None }
    }

    /// Whether a host capability is present.
    pub fn is_available(&self) -> bool {
        self.host.is_some()
    }

    /// Asks the host whether a key is selected.
    ///
    /// A missing capability or a failing host both read as `false`.
    pub async fn check_authenticated(&self) -> bool {
        let Some(host) = &self.host else {
            return false;
        };
        match host.has_selected_api_key().await {
            Ok(selected) => selected,
            Err(e) => {
                tracing::warn!("auth check failed: {e}");
                false
            }
        }
    }

    /// Opens the host's key-selection flow.
    pub async fn request_authentication(&self) -> Result<()> {
        let host = self.host.as_ref().ok_or_else(|| {
            CreativeFlowError::AuthUnavailable(
                "API key selection not available in this environment".into(),
            )
        })?;
        host.open_select_key().await
    }
}

/// Host for terminals and services: a key is "selected" when one is configured.
#[derive(Debug, Clone, Copy)]
pub struct StaticKeyHost {
    configured: bool,
}

impl StaticKeyHost {
    /// Creates a host reporting whether a key is configured.
    pub fn new(configured: bool) -> Self {
        Self { configured }
    }
}

#[async_trait]
impl HostAuth for StaticKeyHost {
    async fn has_selected_api_key(&self) -> Result<bool> {
        Ok(self.configured)
    }

    async fn open_select_key(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(CreativeFlowError::AuthUnavailable(
                "set API_KEY or GOOGLE_API_KEY to select a key".into(),
            ))
        }
    }
}
