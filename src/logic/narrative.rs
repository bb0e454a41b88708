//! Report narrative service
//!
//! The only outbound call of the application: one prompt embedding a scan
//! summary goes to a Gemini `generateContent` endpoint, prose comes back.
//! Callers go through [`narrative_or_fallback`], which never fails: any error
//! is logged and replaced by a fixed advisory string. One attempt, no retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when the service cannot be reached or rejects the request
pub const FALLBACK_NARRATIVE: &str =
    "An error occurred while generating the security analysis. Please try again later.";

/// Shown when the service answers without any text
pub const EMPTY_NARRATIVE: &str = "Could not retrieve analysis results.";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.95;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Narrative service API key not configured")]
    MissingCredential,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Narrative service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Narrative service returned no text")]
    Empty,
}

#[async_trait]
pub trait NarrativeService: Send + Sync {
    async fn generate_narrative(&self, prompt_context: &str) -> Result<String, NarrativeError>;

    /// Whether a call can succeed at all. Services without a credential always fall back.
    fn has_credential(&self) -> bool {
        true
    }
}

/// Prose plus whether it is the fixed fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub text: String,
    pub is_fallback: bool,
}

pub async fn narrative_or_fallback(service: &dyn NarrativeService, summary: &str) -> Narrative {
    match service.generate_narrative(&build_prompt(summary)).await {
        Ok(text) if !text.trim().is_empty() => Narrative { text, is_fallback: false },
        Ok(_) | Err(NarrativeError::Empty) => {
            tracing::warn!("Narrative service returned no text");
            Narrative { text: EMPTY_NARRATIVE.to_string(), is_fallback: true }
        }
        Err(e) => {
            tracing::error!("Security narrative generation failed: {}", e);
            Narrative { text: FALLBACK_NARRATIVE.to_string(), is_fallback: true }
        }
    }
}

pub fn build_prompt(summary: &str) -> String {
    format!(
        "You are a high-level cybersecurity AI expert specializing in Adversarial Machine Learning and Real-time Data Streaming Security.
Analyze the following summary of a dataset scan result for the A.min security platform, which is integrated with Confluent Cloud (Kafka/Flink).

Focus your insights on:
1. Potential in-flight attack vectors (Poisoning via stream injection, Evasion, etc.)
2. How this impacts real-time model training or decision-making in the Kafka pipeline.
3. Recommended Flink SQL mitigation strategies or Streaming Agent adjustments to isolate these threats.

Context Summary: {}

Please respond in professional English. Use Markdown formatting.",
        summary
    )
}

/// Gemini `generateContent` client
pub struct GeminiNarrative {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiNarrative {
    /// No request timeout is set; a slow answer keeps the report loading.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl NarrativeService for GeminiNarrative {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_narrative(&self, prompt_context: &str) -> Result<String, NarrativeError> {
        let api_key = self.api_key.as_deref().ok_or(NarrativeError::MissingCredential)?;

        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt_context }] }],
            generation_config: GenerationConfig { temperature: TEMPERATURE, top_p: TOP_P },
        };

        tracing::debug!("Requesting security narrative from model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NarrativeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| NarrativeError::Parse(e.to_string()))?;

        parsed.text().ok_or(NarrativeError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FailingService;

    #[async_trait]
    impl NarrativeService for FailingService {
        async fn generate_narrative(&self, _: &str) -> Result<String, NarrativeError> {
            Err(NarrativeError::Network("connection reset".to_string()))
        }
    }

    struct BlankService;

    #[async_trait]
    impl NarrativeService for BlankService {
        async fn generate_narrative(&self, _: &str) -> Result<String, NarrativeError> {
            Ok("   ".to_string())
        }
    }

    fn client(server: &MockServer) -> GeminiNarrative {
        GeminiNarrative::new(Some("test-key".to_string()), "test-model").with_base_url(server.uri())
    }

    #[test]
    fn test_prompt_embeds_summary() {
        let prompt = build_prompt("42 points scanned");
        assert!(prompt.contains("Context Summary: 42 points scanned"));
        assert!(prompt.contains("Markdown"));
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let narrative = narrative_or_fallback(&FailingService, "summary").await;
        assert_eq!(narrative.text, FALLBACK_NARRATIVE);
        assert!(narrative.is_fallback);
    }

    #[tokio::test]
    async fn test_blank_text_uses_empty_message() {
        let narrative = narrative_or_fallback(&BlankService, "summary").await;
        assert_eq!(narrative.text, EMPTY_NARRATIVE);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let service = GeminiNarrative::new(None, "test-model");
        assert!(!service.has_credential());
        let err = service.generate_narrative("x").await.unwrap_err();
        assert!(matches!(err, NarrativeError::MissingCredential));

        let narrative = narrative_or_fallback(&service, "summary").await;
        assert_eq!(narrative.text, FALLBACK_NARRATIVE);
    }

    #[tokio::test]
    async fn test_gemini_success() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "## Findings\n" }, { "text": "- Poisoning detected" }] },
                "finishReason": "STOP"
            }]
        });

        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).generate_narrative("prompt").await.unwrap();
        assert_eq!(text, "## Findings\n- Poisoning detected");
    }

    #[tokio::test]
    async fn test_gemini_quota_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .expect(2)
            .mount(&server)
            .await;

        let service = client(&server);
        let err = service.generate_narrative("prompt").await.unwrap_err();
        assert!(matches!(err, NarrativeError::Api { status: 429, .. }));

        let narrative = narrative_or_fallback(&service, "summary").await;
        assert_eq!(narrative.text, FALLBACK_NARRATIVE);
    }

    #[tokio::test]
    async fn test_gemini_without_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client(&server).generate_narrative("prompt").await.unwrap_err();
        assert!(matches!(err, NarrativeError::Empty));
    }
}
