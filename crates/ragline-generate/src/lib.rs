//! Generation gateway backed by an Ollama-compatible `/api/generate` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use ragline_core::config::{GenerationSettings, ServiceSettings};
use ragline_core::{Error, GenerationGateway, Result};

pub struct OllamaGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl OllamaGenerator {
    pub fn new(service: &ServiceSettings, generation: &GenerationSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(service.timeout())
            .build()
            .map_err(|e| Error::generation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", service.base_url.trim_end_matches('/')),
            model: generation.model.clone(),
            temperature: generation.temperature,
        })
    }
}

#[async_trait]
impl GenerationGateway for OllamaGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: self.temperature.map(|temperature| GenerateOptions { temperature }),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::generation(format!("request to {} timed out", self.endpoint))
                } else {
                    Error::generation(format!("request to {} failed: {e}", self.endpoint))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!("HTTP {status}: {body}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("failed to parse response: {e}")))?;
        let text = parsed
            .response
            .ok_or_else(|| Error::generation("response is missing the `response` field"))?;
        tracing::debug!(
            target: "generate",
            model = %self.model,
            "generated {} chars in {} ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
