//! Gemini (Google) image generation provider.

use crate::config::ClientConfig;
use crate::error::{parse_retry_after, sanitize_error_message, CreativeFlowError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GeneratedImage, ImageModel, ImageRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Gemini image generation provider.
#[derive(Debug, Clone)]
pub struct GeminiImageProvider {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl GeminiImageProvider {
    /// Creates a provider with its own HTTP client.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), Arc::new(config))
    }

    /// Creates a provider sharing an existing HTTP client and configuration.
    pub fn with_client(client: reqwest::Client, config: Arc<ClientConfig>) -> Self {
        Self { client, config }
    }

    /// Model used for a request: pro when asked for, else the configured default.
    pub fn model_for(&self, request: &ImageRequest) -> ImageModel {
        if request.high_quality {
            ImageModel::Pro
        } else {
            self.config.image_model
        }
    }

    async fn generate_impl(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        let start = Instant::now();
        let model = self.model_for(request);

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url,
            model.as_str(),
        );

        let body = GeminiRequest::new(request, model);

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

        let gemini_response: GeminiResponse = response.json().await?;
        let (mime_type, data) = extract_inline_image(gemini_response)?;

        tracing::debug!(
            model = model.as_str(),
            mime_type = %mime_type,
            duration_ms = start.elapsed().as_millis() as u64,
            "image generation complete"
        );

        Ok(GeneratedImage {
            mime_type,
            data,
            model,
        })
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }
}

/// Pulls the first inline image part out of a response.
fn extract_inline_image(response: GeminiResponse) -> Result<(String, String)> {
    // Blocks are reported with HTTP 200
    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
            return Err(CreativeFlowError::ContentBlocked(msg));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| CreativeFlowError::NotFoundInResponse("no image in response".into()))?;

    if let Some(ref finish_reason) = candidate.finish_reason {
        match finish_reason.as_str() {
            "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST" => {
                return Err(CreativeFlowError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    finish_reason
                )));
            }
            _ => {}
        }
    }

    candidate
        .content
        .into_iter()
        .flat_map(|content| content.parts)
        .filter_map(|part| part.inline_data)
        .find_map(|inline| match (inline.mime_type, inline.data) {
            (Some(mime), Some(data)) if !mime.is_empty() && !data.is_empty() => Some((mime, data)),
            _ => None,
        })
        .ok_or_else(|| CreativeFlowError::NotFoundInResponse("no image in response".into()))
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> CreativeFlowError {
    let text = sanitize_error_message(text);
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return CreativeFlowError::RateLimited { retry_after };
    }
    CreativeFlowError::Api {
        status,
        message: text,
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
    image_config: GeminiImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<String>,
}

impl GeminiRequest {
    fn new(req: &ImageRequest, model: ImageModel) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiTextPart {
                    text: req.prompt.clone(),
                }],
            }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: GeminiImageConfig {
                    aspect_ratio: req.aspect_ratio.as_str().to_string(),
                    image_size: model.image_size().map(str::to_string),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}
