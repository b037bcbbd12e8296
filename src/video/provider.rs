//! Video provider trait.

use crate::error::Result;
use crate::video::types::{GeneratedVideo, VideoRequest};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Trait for video generation providers.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Submits a video request and waits for the operation to finish.
    ///
    /// Cancelling `cancel` abandons the wait with
    /// [`CreativeFlowError::Cancelled`](crate::CreativeFlowError::Cancelled).
    async fn generate(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedVideo>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        "Veo (Google)"
    }
}
