//! Client for the hosted multimodal image-generation endpoint

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::{AspectRatio, ImageData, ReferenceImage};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// A single request/response image generation call
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Generate one image. `Ok(None)` means the call succeeded without image data.
    async fn generate(&self, request: &ImageRequest) -> Result<Option<ImageData>>;
}

/// Everything one call to the backend needs
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub reference: Option<ReferenceImage>,
    pub model: String,
    pub aspect_ratio: AspectRatio,
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from config, resolving the API key
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            Error::InvalidConfig(format!(
                "no API key: set api.api_key or the {} environment variable",
                config.api_key_env
            ))
        })?;
        Ok(Self::new(config.base_url.clone(), api_key))
    }

    pub fn endpoint(&self, model: &str) -> String {
        let model = model.trim();
        if model.starts_with("models/") {
            format!("{}/{}:generateContent", self.base_url, model)
        } else {
            format!("{}/models/{}:generateContent", self.base_url, model)
        }
    }
}

#[async_trait]
impl ImageBackend for GeminiClient {
    async fn generate(&self, request: &ImageRequest) -> Result<Option<ImageData>> {
        let body = GenerateContentRequest::from_request(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("{}: {}", status, text.trim())));
        }

        let payload: GenerateContentResponse = response.json().await?;
        payload.first_image()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationSettings,
}

impl GenerateContentRequest {
    fn from_request(request: &ImageRequest) -> Self {
        let mut parts = Vec::new();
        if let Some(reference) = &request.reference {
            parts.push(Part {
                inline_data: Some(InlineData {
                    mime_type: reference.mime_type.clone(),
                    data: reference.data.clone(),
                }),
                text: None,
            });
        }
        parts.push(Part {
            inline_data: None,
            text: Some(request.prompt.clone()),
        });

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationSettings {
                image_config: ImageSettings {
                    aspect_ratio: request.aspect_ratio.as_str().to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    image_config: ImageSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageSettings {
    aspect_ratio: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// First inline image of the first candidate
    fn first_image(self) -> Result<Option<ImageData>> {
        let Some(content) = self.candidates.into_iter().next().and_then(|c| c.content) else {
            return Ok(None);
        };

        for part in content.parts {
            if let Some(inline) = part.inline_data {
                let bytes = BASE64
                    .decode(inline.data.as_bytes())
                    .map_err(|e| Error::Upstream(format!("invalid image payload: {}", e)))?;
                return Ok(Some(ImageData::new(inline.mime_type, bytes)));
            }
        }

        Ok(None)
    }
}
