//! Thin wrapper around the Hugging Face inference API for text generation.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::base::{config::Config, error::InferenceError, types::GenerationParams};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the hugging face implementation.

impl LlmClient {
    pub fn huggingface(config: &Config) -> Self {
        let client = HuggingFaceLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParams,
}

// Specific implementations.

/// Hugging Face LLM client implementation.
#[derive(Clone)]
pub struct HuggingFaceLlmClient {
    client: reqwest::Client,
    url: String,
    api_token: String,
    timeout: Duration,
}

impl HuggingFaceLlmClient {
    /// Create a new Hugging Face LLM client.
    #[instrument(name = "HuggingFaceLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let url = format!("{}/models/{}", config.inference_endpoint.trim_end_matches('/'), config.model);

        info!("Inference endpoint: {}", url);

        Self {
            client: reqwest::Client::new(),
            url,
            api_token: config.huggingfacehub_api_token.clone(),
            timeout: config.inference_timeout(),
        }
    }

    async fn send(&self, prompt: &str, params: GenerationParams) -> Result<(StatusCode, String), InferenceError> {
        let request = TextGenerationRequest { inputs: prompt, parameters: params };

        let response = self.client.post(&self.url).bearer_auth(&self.api_token).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok((status, body))
    }
}

#[async_trait]
impl GenericLlmClient for HuggingFaceLlmClient {
    #[instrument(name = "HuggingFaceLlmClient::generate", skip_all, fields(max_new_tokens = params.max_new_tokens))]
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, InferenceError> {
        debug!("Sending {} byte prompt to the inference endpoint", prompt.len());

        let (status, body) = timeout(self.timeout, self.send(prompt, params)).await.map_err(|_| InferenceError::Timeout(self.timeout))??;

        let text = parse_text_generation_response(prompt, status, &body)?;

        info!("Inference returned {} bytes of text", text.len());

        Ok(text)
    }
}

/// Parse a text-generation response body.
///
/// The text-generation task echoes the prompt at the start of `generated_text`;
/// that echo is stripped so only the continuation is returned.
pub fn parse_text_generation_response(prompt: &str, status: StatusCode, body: &str) -> Result<String, InferenceError> {
    let value = serde_json::from_str::<Value>(body).ok();
    let error_message = value.as_ref().and_then(|v| v.get("error")).map(|e| match e {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(InferenceError::Unauthorized {
            status: status.as_u16(),
            message: error_message.unwrap_or_else(|| body.to_string()),
        });
    }

    if !status.is_success() || error_message.is_some() {
        return Err(InferenceError::Remote {
            status: status.as_u16(),
            message: error_message.unwrap_or_else(|| body.to_string()),
        });
    }

    let generated = value
        .as_ref()
        .and_then(|v| v.get(0))
        .and_then(|first| first.get("generated_text"))
        .and_then(Value::as_str)
        .ok_or_else(|| InferenceError::Malformed(body.to_string()))?;

    if let Some(continuation) = generated.strip_prefix(prompt) {
        Ok(continuation.to_string())
    } else {
        warn!("Generated text does not echo the prompt; returning it unchanged.");
        Ok(generated.to_string())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use serde_json::json;
    use tokio::sync::Mutex;

    use super::*;
    use crate::base::config::ConfigInner;

    const PARAMS: GenerationParams = GenerationParams {
        temperature: 0.5,
        max_new_tokens: 400,
    };

    fn create_test_config(endpoint: &str, timeout_secs: u64) -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                huggingfacehub_api_token: "hf_test".to_string(),
                model: "test/model".to_string(),
                inference_endpoint: endpoint.to_string(),
                inference_timeout_secs: timeout_secs,
                ..Default::default()
            }),
        }
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}")
    }

    #[test]
    fn test_parse_strips_prompt_echo() {
        let body = json!([{ "generated_text": "Write it. Dear landlord," }]).to_string();

        let text = parse_text_generation_response("Write it.", StatusCode::OK, &body).unwrap();

        assert_eq!(text, " Dear landlord,");
    }

    #[test]
    fn test_parse_keeps_text_without_echo() {
        let body = json!([{ "generated_text": "Dear landlord," }]).to_string();

        let text = parse_text_generation_response("Write it.", StatusCode::OK, &body).unwrap();

        assert_eq!(text, "Dear landlord,");
    }

    #[test]
    fn test_parse_allows_empty_generation() {
        let body = json!([{ "generated_text": "Write it." }]).to_string();

        let text = parse_text_generation_response("Write it.", StatusCode::OK, &body).unwrap();

        assert_eq!(text, "");
    }

    #[test]
    fn test_parse_error_field_is_remote_error() {
        let body = json!({ "error": "Model is currently loading" }).to_string();

        let result = parse_text_generation_response("p", StatusCode::SERVICE_UNAVAILABLE, &body);

        assert!(matches!(result, Err(InferenceError::Remote { status: 503, message }) if message == "Model is currently loading"));
    }

    #[test]
    fn test_parse_error_field_with_success_status() {
        let body = json!({ "error": ["bad input"] }).to_string();

        let result = parse_text_generation_response("p", StatusCode::OK, &body);

        assert!(matches!(result, Err(InferenceError::Remote { status: 200, .. })));
    }

    #[test]
    fn test_parse_unauthorized() {
        let result = parse_text_generation_response("p", StatusCode::UNAUTHORIZED, "Invalid credentials in Authorization header");

        assert!(matches!(result, Err(InferenceError::Unauthorized { status: 401, message }) if message.contains("Invalid credentials")));
    }

    #[test]
    fn test_parse_malformed_body() {
        let result = parse_text_generation_response("p", StatusCode::OK, "{\"unexpected\": true}");

        assert!(matches!(result, Err(InferenceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_parameters_and_token() {
        let captured = Arc::new(Mutex::new(None::<(String, Value)>));
        let captured_clone = captured.clone();

        let router = Router::new().route(
            "/models/test/model",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured_clone.clone();
                async move {
                    let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
                    let prompt = body["inputs"].as_str().unwrap_or_default().to_string();
                    *captured.lock().await = Some((auth, body));

                    Json(json!([{ "generated_text": format!("{prompt} Dear landlord, about the rent...") }]))
                }
            }),
        );

        let endpoint = spawn_server(router).await;
        let client = LlmClient::huggingface(&create_test_config(&endpoint, 5));

        let text = client.generate("Draft a reply.", PARAMS).await.unwrap();

        assert_eq!(text, " Dear landlord, about the rent...");

        let (auth, body) = captured.lock().await.take().unwrap();
        assert_eq!(auth, "Bearer hf_test");
        assert_eq!(body["inputs"], "Draft a reply.");
        assert_eq!(body["parameters"]["temperature"], 0.5);
        assert_eq!(body["parameters"]["max_new_tokens"], 400);
    }

    #[tokio::test]
    async fn test_generate_reports_rejected_credentials() {
        let router = Router::new().route(
            "/models/test/model",
            post(|| async { (axum::http::StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid username or password." }))) }),
        );

        let endpoint = spawn_server(router).await;
        let client = LlmClient::huggingface(&create_test_config(&endpoint, 5));

        let result = client.generate("p", PARAMS).await;

        assert!(matches!(result, Err(InferenceError::Unauthorized { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let router = Router::new().route(
            "/models/test/model",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([{ "generated_text": "too late" }]))
            }),
        );

        let endpoint = spawn_server(router).await;
        let client = LlmClient::huggingface(&create_test_config(&endpoint, 1));

        let result = client.generate("p", PARAMS).await;

        assert!(matches!(result, Err(InferenceError::Timeout(d)) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_generate_reports_transport_failure() {
        // Nothing listens on this port once the listener is dropped.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = LlmClient::huggingface(&create_test_config(&endpoint, 5));

        let result = client.generate("p", PARAMS).await;

        assert!(matches!(result, Err(InferenceError::Transport(_))));
    }
}
