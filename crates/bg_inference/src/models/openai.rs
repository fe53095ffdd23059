use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use bg_core::config::GenerationConfig;
use bg_core::{ContentGenerator, Error, GenerationResult, Result};

const SERVICE: &str = "openai";

/// Tokens shared by the prompt and the completion.
pub const CONTEXT_TOKEN_CEILING: i64 = 4000;

const TEMPERATURE: f32 = 0.3;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

/// Output budget left after the prompt: the ceiling minus the prompt length.
pub fn token_budget(prompt: &str) -> Result<u32> {
    let budget = CONTEXT_TOKEN_CEILING - prompt.chars().count() as i64;
    if budget <= 0 {
        return Err(Error::InvalidRequest(format!(
            "prompt of {} characters leaves no room under the {} token ceiling",
            prompt.chars().count(),
            CONTEXT_TOKEN_CEILING
        )));
    }
    Ok(budget as u32)
}

pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let max_tokens = token_budget(prompt)?;
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            temperature: TEMPERATURE,
            max_tokens,
            n: 1,
        };

        let response = self.client
            .post(format!("{}/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::upstream(SERVICE, format!("status {}: {}", status, body)));
        }

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::upstream(SERVICE, format!("malformed response: {}", e)))?;
        if completion.choices.is_empty() {
            return Err(Error::EmptyResult("completion returned no choices".to_string()));
        }

        tracing::debug!("Received {} completion choice(s)", completion.choices.len());
        Ok(GenerationResult {
            candidates: completion.choices.into_iter().map(|c| c.text).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serve;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn generator(base_url: &str) -> OpenAiGenerator {
        let config = GenerationConfig {
            api_key: "sk-test".to_string(),
            model: "text-davinci-002".to_string(),
        };
        OpenAiGenerator::new(&config, Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[test]
    fn test_token_budget() {
        assert_eq!(token_budget("abcd").unwrap(), 3996);
        let too_long = "x".repeat(CONTEXT_TOKEN_CEILING as usize);
        assert!(matches!(token_budget(&too_long), Err(Error::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_generate_sends_completion_request() {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            "/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *captured.lock().unwrap() = Some((auth, body));
                    Json(json!({ "choices": [{ "text": "<h1>Hi</h1>" }, { "text": "<p>second</p>" }] }))
                }
            }),
        );
        let base_url = serve(app).await;

        let result = generator(&base_url).generate("Write about pugs").await.unwrap();
        assert_eq!(result.first(), Some("<h1>Hi</h1>"));
        assert_eq!(result.candidates.len(), 2);

        let (auth, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "text-davinci-002");
        assert_eq!(body["prompt"], "Write about pugs");
        assert_eq!(body["n"], 1);
        assert_eq!(body["max_tokens"], 4000 - 16);
    }

    #[tokio::test]
    async fn test_generate_rejects_overlong_prompt_without_calling_upstream() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    Json(json!({ "choices": [] }))
                }
            }),
        );
        let base_url = serve(app).await;

        let prompt = "x".repeat(5000);
        let err = generator(&base_url).generate(&prompt).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generate_empty_choices() {
        let app = Router::new().route(
            "/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base_url = serve(app).await;

        let err = generator(&base_url).generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::EmptyResult(_)));
    }

    #[tokio::test]
    async fn test_generate_upstream_failure() {
        let app = Router::new().route(
            "/completions",
            post(|| async {
                (StatusCode::TOO_MANY_REQUESTS, Json(json!({ "error": { "message": "slow down" } })))
            }),
        );
        let base_url = serve(app).await;

        let err = generator(&base_url).generate("prompt").await.unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn test_generate_malformed_payload() {
        let app = Router::new().route(
            "/completions",
            post(|| async { Json(json!({ "id": "cmpl-1" })) }),
        );
        let base_url = serve(app).await;

        let err = generator(&base_url).generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { service: "openai", .. }));
    }
}
