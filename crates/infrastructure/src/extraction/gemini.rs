use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use domain::{DomainError, ImageMime, MeterImageExtractor};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const EXTRACTION_PROMPT: &str =
    "Read the numeric value displayed on this utility meter. Respond with only the number.";

/// Gemini vision implementation of the extraction port.
///
/// Sends the image inline (base64) to the generateContent endpoint and returns
/// the first text part of the first candidate. The reqwest client carries its
/// own timeout in addition to the service-level bound.
pub struct GeminiVisionExtractor {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiVisionExtractor {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::ExtractionFailed(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn first_text(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
    }
}

#[async_trait]
impl MeterImageExtractor for GeminiVisionExtractor {
    async fn extract(&self, image: &[u8], mime: ImageMime) -> Result<String, DomainError> {
        let encoded = BASE64.encode(image);
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": EXTRACTION_PROMPT },
                    { "inline_data": { "mime_type": mime.mime_type(), "data": encoded } }
                ]
            }]
        });

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, bytes = image.len(), "sending meter image for extraction");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::ExtractionFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::ExtractionFailed(format!(
                "model returned HTTP {}: {:.200}",
                status, detail
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            DomainError::ExtractionFailed(format!("unreadable model response: {}", e))
        })?;

        let text = Self::first_text(parsed).ok_or_else(|| {
            DomainError::ExtractionFailed("model response contained no text part".to_string())
        })?;

        info!(chars = text.len(), "extraction response received");
        Ok(text)
    }
}
