//! Google Gemini analysis provider.
//!
//! Sends the identity analysis prompt, with the OCR text embedded and the
//! document image attached inline, to `models/{model}:generateContent`.

use super::{
    secrets::{ApiCredential, CredentialSource},
    AnalysisProvider, AnalysisRequest, ProviderError,
};
use crate::config::AnalysisConfig;
use crate::prompts::build_analysis_prompt;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable name for the Gemini API key.
pub const GOOGLE_GEMINI_API_KEY_ENV: &str = "GOOGLE_GEMINI_API_KEY";

/// Config key for the Gemini API key.
pub const GEMINI_API_KEY_CONFIG: &str = "gemini_api_key";

/// Default Generative Language API base URL.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Google Gemini provider.
#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
pub struct GeminiProvider {
    credential: ApiCredential,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider with default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(
            ApiCredential::new(api_key, CredentialSource::Programmatic, "Gemini API key"),
            &AnalysisConfig::default(),
        )
    }

    /// Create from an already loaded credential.
    pub fn with_credential(credential: ApiCredential, config: &AnalysisConfig) -> Self {
        Self {
            credential,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout,
        }
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[cfg_attr(not(feature = "gemini"), allow(dead_code))]
    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
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
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Build the request body for one analysis call.
#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn build_request(request: &AnalysisRequest<'_>, temperature: Option<f32>) -> GenerateRequest {
    let mut parts = vec![Part {
        text: Some(build_analysis_prompt(request.ocr_text)),
        inline_data: None,
    }];

    if let Some(image) = request.image {
        parts.push(Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.to_string(),
                data: STANDARD.encode(image.bytes),
            }),
        });
    }

    GenerateRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
    }
}

/// Concatenate the text parts of the first candidate.
#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn parse_generate_response(body: &str) -> Result<String, ProviderError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ParseError("response contained no candidates".to_string()))?;

    Ok(candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default())
}

/// Message of an error response, or the raw body if it is not the usual shape.
#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn error_message(body: &str) -> String {
    match serde_json::from_str::<GeminiError>(body) {
        Ok(err) => match err.error.status {
            Some(status) => format!("{} ({})", err.error.message, status),
            None => err.error.message,
        },
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    #[cfg(feature = "gemini")]
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<String, ProviderError> {
        let client = super::http_client();
        let body = build_request(&request, self.temperature);

        // SECURITY: Only expose the credential here, at the point of use
        let response = client
            .post(self.generate_url())
            .header("x-goog-api-key", self.credential.expose())
            .header("content-type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_generate_response(&text)
    }

    #[cfg(not(feature = "gemini"))]
    async fn analyze(&self, _request: AnalysisRequest<'_>) -> Result<String, ProviderError> {
        Err(ProviderError::NotConfigured(
            "Gemini provider requires 'gemini' feature".to_string(),
        ))
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kavach_core::UploadedDocument;
    use serde_json::json;

    #[test]
    fn test_request_with_inline_image() {
        let document = UploadedDocument::new(b"abc".to_vec(), "aadhaar.png", "image/png");
        let request = AnalysisRequest::text("Rajesh Kumar\nDOB: 12/04/1990").with_image(&document);

        let body = serde_json::to_value(build_request(&request, None)).unwrap();
        let parts = &body["contents"][0]["parts"];

        assert_eq!(body["contents"][0]["role"], "user");
        assert!(parts[0]["text"]
            .as_str()
            .unwrap()
            .contains("Rajesh Kumar\nDOB: 12/04/1990"));
        assert_eq!(
            parts[1]["inlineData"],
            json!({"mimeType": "image/png", "data": "YWJj"})
        );
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_text_only_request_with_temperature() {
        let body =
            serde_json::to_value(build_request(&AnalysisRequest::text(""), Some(0.2))).unwrap();
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_response_joins_first_candidate_parts() {
        let body = json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "```json\n{\"name\": "}, {"text": "\"Amit\"}\n```"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        })
        .to_string();
        assert_eq!(
            parse_generate_response(&body).unwrap(),
            "```json\n{\"name\": \"Amit\"}\n```"
        );
    }

    #[test]
    fn test_response_without_candidates_fails() {
        assert!(matches!(
            parse_generate_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(ProviderError::ParseError(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid. (INVALID_ARGUMENT)");
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
    }

    #[test]
    fn test_generate_url() {
        let provider = GeminiProvider::new("key").with_base_url("http://localhost:8080/v1beta/");
        assert_eq!(
            provider.generate_url(),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
        let provider = provider.with_model("gemini-1.5-pro");
        assert!(provider.generate_url().ends_with("models/gemini-1.5-pro:generateContent"));
    }
}
