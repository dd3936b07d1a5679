//! LLM client trait and implementations.
//!
//! `HttpLlmClient` talks to an Ollama-compatible completion endpoint; the
//! model itself runs in that external process. `MockLlm` returns a canned
//! answer for tests and offline wiring.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Client for a text completion backend.
pub trait LlmClient: Send + Sync {
    /// Run one non-streaming completion for the given prompt.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}

/// Object-safe version of [`LlmClient`] for dynamic dispatch, with a blanket
/// impl over every `LlmClient`.
pub trait DynLlmClient: Send + Sync {
    fn complete_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, GenerationError>> + Send + 'a>,
    >;
}

impl<T: LlmClient> DynLlmClient for T {
    fn complete_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, GenerationError>> + Send + 'a>,
    > {
        Box::pin(self.complete(prompt))
    }
}

// ---------------------------------------------------------------------------
// HttpLlmClient
// ---------------------------------------------------------------------------

/// HTTP client for an Ollama-compatible `/api/generate` endpoint.
///
/// Streaming is always disabled; the answer comes back as one JSON body and
/// is returned trimmed.
#[derive(Clone)]
pub struct HttpLlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl std::fmt::Debug for HttpLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLlmClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl HttpLlmClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            max_tokens,
            temperature,
        }
    }
}

impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        #[derive(Serialize)]
        struct GenerateReq<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: GenerateOptions,
        }

        #[derive(Serialize)]
        struct GenerateOptions {
            num_predict: u32,
            temperature: f64,
        }

        #[derive(Deserialize)]
        struct GenerateResp {
            response: String,
        }

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&GenerateReq {
                model: &self.model,
                prompt,
                stream: false,
                options: GenerateOptions {
                    num_predict: self.max_tokens,
                    temperature: self.temperature,
                },
            })
            .send()
            .await
            .map_err(|e| GenerationError::Llm(friendly_llm_error(&e.to_string())))?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Llm(friendly_llm_error(&format!(
                "completion endpoint returned {}: {}",
                status,
                body.trim()
            ))));
        }

        let parsed = response
            .json::<GenerateResp>()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        Ok(parsed.response.trim().to_string())
    }
}

/// Rewrite well-known failure classes into actionable messages; anything
/// unrecognized passes through untouched.
fn friendly_llm_error(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    if lowered.contains("rate limit") {
        return "LLM rate limit exceeded, try again later".to_string();
    }
    if lowered.contains("authentication")
        || lowered.contains("unauthorized")
        || lowered.contains("api key")
    {
        return "LLM authentication failed, check configuration".to_string();
    }
    if lowered.contains("timed out") || lowered.contains("timeout") {
        return "LLM request timed out".to_string();
    }
    raw.to_string()
}

// ---------------------------------------------------------------------------
// MockLlm
// ---------------------------------------------------------------------------

/// Mock LLM that returns a fixed answer, recording the prompts it saw.
#[derive(Debug, Default)]
pub struct MockLlm {
    answer: String,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl MockLlm {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Prompts passed to `complete`, in call order.
    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LlmClient for MockLlm {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn complete_sends_model_options_and_trims_answer() {
        let server = MockServer::start_async().await;
        let generate = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate").json_body_includes(
                    r#"{"model": "llama3.1", "stream": false, "options": {"num_predict": 500, "temperature": 0.3}}"#,
                );
                then.status(200)
                    .json_body(serde_json::json!({"response": "  the answer  \n"}));
            })
            .await;

        let client = HttpLlmClient::new(
            reqwest::Client::new(),
            server.base_url(),
            "llama3.1",
            500,
            0.3,
        );
        let answer = client.complete("prompt text").await.unwrap();

        generate.assert_async().await;
        assert_eq!(answer, "the answer");
    }

    #[tokio::test]
    async fn complete_maps_non_success_status_to_llm_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("model exploded");
            })
            .await;

        let client = HttpLlmClient::new(
            reqwest::Client::new(),
            server.base_url(),
            "llama3.1",
            500,
            0.3,
        );
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Llm(_)));
        assert!(err.to_string().contains("model exploded"));
    }

    #[tokio::test]
    async fn complete_flags_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(serde_json::json!({"unexpected": true}));
            })
            .await;

        let client = HttpLlmClient::new(
            reqwest::Client::new(),
            server.base_url(),
            "llama3.1",
            500,
            0.3,
        );
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn mock_llm_records_prompts() {
        let llm = MockLlm::new("fixed");
        assert_eq!(llm.complete("p1").await.unwrap(), "fixed");
        assert_eq!(llm.complete("p2").await.unwrap(), "fixed");
        assert_eq!(llm.seen_prompts(), vec!["p1", "p2"]);
    }

    #[test]
    fn friendly_llm_error_classifies_common_failures() {
        assert_eq!(
            friendly_llm_error("Rate limit hit for tier"),
            "LLM rate limit exceeded, try again later"
        );
        assert_eq!(
            friendly_llm_error("invalid api key supplied"),
            "LLM authentication failed, check configuration"
        );
        assert_eq!(
            friendly_llm_error("operation timed out after 30s"),
            "LLM request timed out"
        );
        assert_eq!(friendly_llm_error("weird failure"), "weird failure");
    }
}
