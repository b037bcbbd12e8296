//! Veo (Google) video generation provider.

use crate::config::ClientConfig;
use crate::error::{
    is_entity_not_found, parse_retry_after, sanitize_error_message, CreativeFlowError, Result,
};
use crate::video::poll::{until_cancelled, wait_until_done, LongRunning};
use crate::video::provider::VideoProvider;
use crate::video::types::{GeneratedVideo, VideoRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Veo video generation provider.
#[derive(Debug, Clone)]
pub struct VeoProvider {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl VeoProvider {
    /// Creates a provider with its own HTTP client.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), Arc::new(config))
    }

    /// Creates a provider sharing an existing HTTP client and configuration.
    pub fn with_client(client: reqwest::Client, config: Arc<ClientConfig>) -> Self {
        Self { client, config }
    }

    /// Submit a video generation request.
    async fn submit(&self, request: &VideoRequest) -> Result<VeoOperationResponse> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.config.base_url,
            self.config.video_model.as_str(),
        );

        let body = VeoRequest::new(request, &self.config);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.credential.expose())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }

    /// Fetch the current state of an operation by name.
    async fn fetch_operation(&self, operation_name: &str) -> Result<VeoOperationResponse> {
        let url = format!("{}/{}", self.config.base_url, operation_name);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.config.credential.expose())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }

    /// Appends the credential to a download URI (the file endpoint requires it).
    fn authorize(&self, uri: &str) -> String {
        let separator = if uri.contains('?') { '&' } else { '?' };
        format!(
            "{}{}key={}",
            uri,
            separator,
            self.config.credential.expose()
        )
    }
}

#[async_trait]
impl VideoProvider for VeoProvider {
    async fn generate(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedVideo> {
        request.validate()?;
        let start = Instant::now();

        let operation = until_cancelled(cancel, self.submit(request)).await?;
        let operation_name = operation.name.clone();
        tracing::debug!(operation = %operation_name, "submitted video generation request");

        let finished = wait_until_done(operation, &self.config.poll, cancel, |name| async move {
            self.fetch_operation(&name).await
        })
        .await?;

        let uri = extract_video_uri(finished)?;
        tracing::debug!(
            operation = %operation_name,
            duration_ms = start.elapsed().as_millis() as u64,
            "video generation complete"
        );

        Ok(GeneratedVideo {
            authorized_uri: self.authorize(&uri),
            model: self.config.video_model,
            operation: operation_name,
        })
    }
}

/// Extract the video URI from a finished operation.
fn extract_video_uri(operation: VeoOperationResponse) -> Result<String> {
    // Check for error FIRST before checking response
    if let Some(err) = operation.error {
        let message = sanitize_error_message(&err.message.unwrap_or_else(|| "Unknown error".into()));
        if is_entity_not_found(&message) {
            return Err(CreativeFlowError::InvalidCredential(message));
        }
        return Err(CreativeFlowError::VideoGeneration(message));
    }

    if let Some(gen_resp) = operation.response.and_then(|r| r.generate_video_response) {
        if gen_resp.rai_media_filtered_count.unwrap_or(0) > 0
            && gen_resp
                .generated_samples
                .as_ref()
                .is_none_or(|s| s.is_empty())
        {
            let reason = gen_resp
                .rai_media_filtered_reasons
                .and_then(|r| r.into_iter().next())
                .unwrap_or_else(|| "Video was filtered by Veo safety filters".into());
            return Err(CreativeFlowError::ContentBlocked(reason));
        }

        if let Some(uri) = gen_resp
            .generated_samples
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|sample| sample.video)
            .and_then(|video| video.uri)
            .filter(|uri| !uri.is_empty())
        {
            return Ok(uri);
        }
    }

    Err(CreativeFlowError::NotFoundInResponse("no video URI".into()))
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> CreativeFlowError {
    let text = sanitize_error_message(text);
    if is_entity_not_found(&text) {
        return CreativeFlowError::InvalidCredential(text);
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return CreativeFlowError::RateLimited { retry_after };
    }
    CreativeFlowError::Api {
        status,
        message: text,
    }
}

// Wire format

#[derive(Debug, Serialize)]
struct VeoRequest {
    instances: Vec<VeoInstance>,
    parameters: VeoParameters,
}

#[derive(Debug, Serialize)]
struct VeoInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoParameters {
    aspect_ratio: String,
    resolution: String,
    number_of_videos: u32,
}

impl VeoRequest {
    fn new(req: &VideoRequest, config: &ClientConfig) -> Self {
        Self {
            instances: vec![VeoInstance {
                prompt: req.prompt.clone(),
            }],
            parameters: VeoParameters {
                aspect_ratio: req.aspect_ratio.as_str().to_string(),
                resolution: config.video_resolution.as_str().to_string(),
                number_of_videos: 1,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct VeoOperationResponse {
    name: String,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    response: Option<VeoVideoResponse>,
    #[serde(default)]
    error: Option<VeoError>,
}

impl LongRunning for VeoOperationResponse {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_done(&self) -> bool {
        // An error ends the operation even if `done` was omitted.
        self.done.unwrap_or(false) || self.error.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoVideoResponse {
    #[serde(default)]
    generate_video_response: Option<VeoGenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoGenerateVideoResponse {
    #[serde(default)]
    generated_samples: Option<Vec<VeoGeneratedSample>>,
    #[serde(default)]
    rai_media_filtered_count: Option<u32>,
    #[serde(default)]
    rai_media_filtered_reasons: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct VeoGeneratedSample {
    #[serde(default)]
    video: Option<VeoVideo>,
}

#[derive(Debug, Deserialize)]
struct VeoVideo {
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VeoError {
    #[serde(default)]
    message: Option<String>,
}
