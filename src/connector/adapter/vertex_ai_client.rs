use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::GenerativeModel;
use crate::connector::adapter::gcp::http_client;
use crate::connector::adapter::{AccessTokenProvider, GcpSettings};
use crate::domain::DomainError;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// The subset of the `generateContent` response we read. Every level is
/// optional so a missing field becomes a shape error, not a decode error.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini on Vertex AI via the `generateContent` REST method.
///
/// Sends the prompt as one `user` turn asking for a single candidate and
/// returns `candidates[0].content.parts[0].text`. Authentication uses a
/// bearer token from the configured [`AccessTokenProvider`].
///
/// Environment overrides (see [`VertexAiClient::from_lookup`]):
///
/// ```text
/// VERTEX_AI_MODEL=gemini-1.5-pro
/// VERTEX_AI_BASE_URL=http://localhost:9090
/// VERTEX_AI_TIMEOUT_SECS=30
/// VERTEX_AI_TEMPERATURE=0.4
/// VERTEX_AI_MAX_OUTPUT_TOKENS=1024
/// ```
pub struct VertexAiClient {
    client: reqwest::Client,
    timeout: Duration,
    token_provider: Arc<dyn AccessTokenProvider>,
    base_url: String,
    project_id: String,
    region: String,
    model: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl VertexAiClient {
    pub fn new(settings: &GcpSettings, token_provider: Arc<dyn AccessTokenProvider>) -> Self {
        let region = settings.region().to_string();
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            timeout: DEFAULT_TIMEOUT,
            token_provider,
            base_url: format!("https://{region}-aiplatform.googleapis.com"),
            project_id: settings.project_id().unwrap_or_default().to_string(),
            region,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Like [`VertexAiClient::new`], with overrides read from the process
    /// environment.
    pub fn from_env(settings: &GcpSettings, token_provider: Arc<dyn AccessTokenProvider>) -> Self {
        Self::from_lookup(settings, token_provider, |key| std::env::var(key).ok())
    }

    /// Apply overrides found through `lookup`:
    ///
    /// | Variable                      | Purpose                             |
    /// |-------------------------------|-------------------------------------|
    /// | `VERTEX_AI_MODEL`             | Model id, default `gemini-1.5-flash` |
    /// | `VERTEX_AI_BASE_URL`          | Endpoint base, e.g. a local fake    |
    /// | `VERTEX_AI_TIMEOUT_SECS`      | Request timeout, default 60         |
    /// | `VERTEX_AI_TEMPERATURE`       | Sampling temperature                |
    /// | `VERTEX_AI_MAX_OUTPUT_TOKENS` | Output token cap                    |
    ///
    /// Values that do not parse are logged and ignored.
    pub fn from_lookup(
        settings: &GcpSettings,
        token_provider: Arc<dyn AccessTokenProvider>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut client = Self::new(settings, token_provider);
        if let Some(model) = lookup("VERTEX_AI_MODEL") {
            client = client.with_model(model);
        }
        if let Some(base_url) = lookup("VERTEX_AI_BASE_URL") {
            client = client.with_base_url(base_url);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "VERTEX_AI_TIMEOUT_SECS") {
            if secs == 0 {
                warn!("Ignoring VERTEX_AI_TIMEOUT_SECS=0");
            } else {
                client = client.with_timeout(Duration::from_secs(secs));
            }
        }
        if let Some(temperature) = parse_var::<f32>(&lookup, "VERTEX_AI_TEMPERATURE") {
            client = client.with_temperature(temperature);
        }
        if let Some(max_output_tokens) = parse_var::<u32>(&lookup, "VERTEX_AI_MAX_OUTPUT_TOKENS") {
            client = client.with_max_output_tokens(max_output_tokens);
        }
        client
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{base}/v1/projects/{project}/locations/{region}/publishers/google/models/{model}:generateContent",
            base = self.base_url,
            project = self.project_id,
            region = self.region,
            model = self.model,
        )
    }

    fn build_request<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                candidate_count: 1,
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    /// Pull the first candidate's text out of the envelope. Which level is
    /// missing is not distinguished.
    fn extract_text(response: GenerateContentResponse) -> Result<String, DomainError> {
        response
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                DomainError::malformed_ai_response(
                    "response has no text at candidates[0].content.parts[0]",
                )
            })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[async_trait]
impl GenerativeModel for VertexAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        if self.project_id.is_empty() {
            return Err(DomainError::ai_service_unavailable(
                "VertexAiClient: no GCP project id configured",
            ));
        }

        let token = self
            .token_provider
            .access_token()
            .await
            .map_err(|e| DomainError::ai_service_unavailable(format!("VertexAiClient: {e}")))?;

        debug!("Sending generateContent request for model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                DomainError::ai_service_unavailable(format!("VertexAiClient: request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("VertexAiClient: API returned {status}: {body}");
            return Err(DomainError::ai_service_unavailable(format!(
                "VertexAiClient: API returned {status}"
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            DomainError::ai_service_unavailable(format!(
                "VertexAiClient: failed to decode response: {e}"
            ))
        })?;

        Self::extract_text(body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::connector::adapter::StaticTokenProvider;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).expect("valid json")
    }

    fn client() -> VertexAiClient {
        VertexAiClient::new(
            &GcpSettings::new("demo-project", "europe-west4"),
            Arc::new(StaticTokenProvider::new("token")),
        )
    }

    #[test]
    fn endpoint_targets_regional_publisher_model() {
        assert_eq!(
            client().endpoint(),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/demo-project/locations/europe-west4/publishers/google/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn endpoint_honours_base_url_and_model_overrides() {
        let client = client()
            .with_base_url("http://127.0.0.1:9090/")
            .with_model("gemini-1.5-pro");
        assert!(client
            .endpoint()
            .starts_with("http://127.0.0.1:9090/v1/projects/demo-project/"));
        assert!(client.endpoint().ends_with("models/gemini-1.5-pro:generateContent"));
    }

    fn client_from(vars: &[(&str, &str)]) -> VertexAiClient {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VertexAiClient::from_lookup(
            &GcpSettings::new("demo-project", "us-central1"),
            Arc::new(StaticTokenProvider::new("token")),
            |key| vars.get(key).cloned(),
        )
    }

    #[test]
    fn generation_settings_come_from_the_environment() {
        let client = client_from(&[
            ("VERTEX_AI_MODEL", "gemini-1.5-pro"),
            ("VERTEX_AI_TIMEOUT_SECS", "15"),
            ("VERTEX_AI_TEMPERATURE", "0.5"),
            ("VERTEX_AI_MAX_OUTPUT_TOKENS", "256"),
        ]);

        assert_eq!(client.model_name(), "gemini-1.5-pro");
        assert_eq!(client.timeout(), Duration::from_secs(15));
        let value = serde_json::to_value(client.build_request("p")).unwrap();
        assert_eq!(
            value["generationConfig"],
            serde_json::json!({"candidateCount": 1, "temperature": 0.5, "maxOutputTokens": 256})
        );
    }

    #[test]
    fn unparseable_settings_keep_defaults() {
        let client = client_from(&[
            ("VERTEX_AI_TIMEOUT_SECS", "soon"),
            ("VERTEX_AI_TEMPERATURE", "warm"),
            ("VERTEX_AI_MAX_OUTPUT_TOKENS", "-1"),
        ]);

        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        let value = serde_json::to_value(client.build_request("p")).unwrap();
        assert_eq!(value["generationConfig"], serde_json::json!({"candidateCount": 1}));
    }

    #[test]
    fn zero_timeout_is_ignored() {
        assert_eq!(
            client_from(&[("VERTEX_AI_TIMEOUT_SECS", "0")]).timeout(),
            DEFAULT_TIMEOUT
        );
    }

    #[test]
    fn request_is_a_single_user_turn() {
        let client = client().with_temperature(0.5);
        let value = serde_json::to_value(client.build_request("score this")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "score this"}]}],
                "generationConfig": {"candidateCount": 1, "temperature": 0.5}
            })
        );
    }

    #[test]
    fn extracts_first_candidate_text() {
        let response = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Clarity: 4/5"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(VertexAiClient::extract_text(response).unwrap(), "Clarity: 4/5");
    }

    #[test]
    fn every_missing_level_is_malformed() {
        let cases = [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{}]}"#,
            r#"{"candidates":[{"content":{}}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
        ];

        for case in cases {
            let err = VertexAiClient::extract_text(parse(case)).unwrap_err();
            assert!(
                matches!(err, DomainError::MalformedAiResponse(_)),
                "expected malformed response for {case}"
            );
        }
    }

    #[tokio::test]
    async fn missing_project_fails_without_network() {
        let client = VertexAiClient::new(
            &GcpSettings::from_lookup(|_| None),
            Arc::new(StaticTokenProvider::new("token")),
        );
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, DomainError::AiServiceUnavailable(_)));
    }
}
