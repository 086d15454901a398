//! Inference backends and the prediction driver.
//!
//! The evaluation harness only consumes pre-computed predictions. This
//! module produces them: an [`InferenceBackend`] is an opaque
//! `(text) -> text` call, and [`generate_predictions`] drives it over the
//! test split with bounded concurrency while keeping input order.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::error::{BrainbugError, Result};
use crate::domain::example::CuratedExample;
use crate::metrics::METRICS;
use crate::obs::emit_predictions_generated;

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// A text-to-text model call.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn generate(&self, input: &str) -> Result<String>;
}

/// Prompt sent to the model for one example.
///
/// Repair examples are conditioned on their error category:
/// `Fix {error_type}: {faulty_code}`.
pub fn repair_prompt(example: &CuratedExample) -> String {
    match example {
        CuratedExample::Repair(ex) => format!("Fix {}: {}", ex.error_type, ex.faulty_code),
        CuratedExample::Detection(ex) => format!("Fix: {}", ex.code),
    }
}

/// Generate one prediction per example (up to `max_pairs`), running at most
/// `concurrency` requests at once. Predictions come back in example order.
/// The first backend error aborts the run.
pub async fn generate_predictions<B>(
    backend: &B,
    examples: &[CuratedExample],
    max_pairs: usize,
    concurrency: usize,
) -> Result<Vec<String>>
where
    B: InferenceBackend + ?Sized,
{
    let limit = examples.len().min(max_pairs);
    info!(
        candidates = examples.len(),
        requested = limit,
        concurrency,
        "generating predictions"
    );

    let predictions: Vec<String> = stream::iter(examples[..limit].iter().enumerate())
        .map(|(idx, example)| async move {
            let prompt = repair_prompt(example);
            let prediction = backend.generate(&prompt).await?;
            debug!(idx, chars = prediction.len(), "prediction received");
            METRICS.inc_predictions_generated();
            Ok::<_, BrainbugError>(prediction)
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    emit_predictions_generated(limit, predictions.len());
    Ok(predictions)
}

// ---------------------------------------------------------------------------
// HTTP backend
// ---------------------------------------------------------------------------

/// Hosted text-generation endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpInferenceConfig {
    /// Full model endpoint URL.
    pub endpoint: String,
    /// Bearer token (optional for local servers).
    pub token: Option<String>,
    /// `parameters.max_length` sent with each request.
    pub max_length: usize,
}

impl HttpInferenceConfig {
    pub fn new(endpoint: &str, max_length: usize) -> Self {
        HttpInferenceConfig {
            endpoint: endpoint.to_string(),
            token: None,
            max_length,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_length: usize,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

/// Pull the generated text out of an endpoint response. Accepts
/// `[{"generated_text": ...}]` and `{"generated_text": ...}`.
pub fn parse_generation_response(body: serde_json::Value) -> Result<String> {
    let raw = body.to_string();
    match serde_json::from_value::<GenerationResponse>(body) {
        Ok(GenerationResponse::Single(g)) => Ok(g.generated_text),
        Ok(GenerationResponse::Batch(batch)) => batch
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| BrainbugError::Inference("empty generation batch".to_string())),
        Err(_) => Err(BrainbugError::Inference(format!(
            "unexpected response body: {}",
            crate::domain::example::truncate_chars(&raw, 200)
        ))),
    }
}

/// Backend that POSTs to a hosted text-generation endpoint.
pub struct HttpInferenceBackend {
    config: HttpInferenceConfig,
    http_client: reqwest::Client,
}

impl HttpInferenceBackend {
    pub fn new(config: HttpInferenceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("brainbug/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpInferenceBackend {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn generate(&self, input: &str) -> Result<String> {
        let request = GenerationRequest {
            inputs: input,
            parameters: GenerationParameters {
                max_length: self.config.max_length,
            },
        };

        let mut builder = self.http_client.post(&self.config.endpoint).json(&request);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrainbugError::Inference(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        parse_generation_response(body)
    }
}
