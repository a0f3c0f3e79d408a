//! Google Gemini backend.

use std::time::Duration;

use async_trait::async_trait;
use discovery_types::{dedupe_hints, Outcome};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::diff::DiffApplier;
use crate::embedding::EmbeddingSpace;
use crate::error::{OracleError, OracleResult};
use crate::oracle::{Oracle, Regression};
use crate::prompts::PromptBuilder;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Thin client for the `generateContent` and `embedContent` endpoints.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> OracleResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> OracleResult<Url> {
        let base = self.endpoint.trim_end_matches('/');
        let raw = format!("{}/v1beta/models/{}:{}", base, model, method);
        let mut url = Url::parse(&raw)
            .map_err(|e| OracleError::InvalidConfig(format!("invalid gemini endpoint {}: {}", raw, e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn post(&self, url: Url, payload: &Value) -> OracleResult<Value> {
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Transport(format!(
                "gemini error {}: {}",
                status,
                truncate(&body, 320)
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(format!("invalid gemini response: {}", e)))
    }

    /// Generate text. With `hint_schema` the reply is constrained to a JSON
    /// array of `{"description": ...}` objects.
    pub async fn generate(&self, model: &str, prompt: &str, hint_schema: bool) -> OracleResult<String> {
        let mut payload = json!({
            "contents": [
                {
                    "parts": [
                        {
                            "text": prompt
                        }
                    ]
                }
            ]
        });

        if hint_schema {
            payload["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "description": { "type": "STRING" }
                        },
                        "required": ["description"]
                    }
                }
            });
        }

        let body = self.post(self.model_url(model, "generateContent")?, &payload).await?;
        let output = extract_candidate_text(&body);
        if output.trim().is_empty() {
            return Err(OracleError::Generation(format!("{} returned no text", model)));
        }
        Ok(output.trim().to_string())
    }

    /// Embed `text` with an embedding model.
    pub async fn embed(&self, model: &str, text: &str) -> OracleResult<Vec<f64>> {
        let payload = json!({
            "content": {
                "parts": [
                    {
                        "text": text
                    }
                ]
            }
        });

        let body = self.post(self.model_url(model, "embedContent")?, &payload).await?;
        let values: Vec<f64> = body["embedding"]["values"]
            .as_array()
            .map(|values| values.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default();
        if values.is_empty() {
            return Err(OracleError::Embedding(format!("{} returned no values", model)));
        }
        Ok(values)
    }
}

fn extract_candidate_text(body: &Value) -> String {
    body["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HintRecord {
    Described { description: String },
    Plain(String),
}

/// Parse a hint list reply, tolerating markdown code fences.
pub fn parse_hints(raw: &str) -> OracleResult<Vec<String>> {
    let body = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let records: Vec<HintRecord> = serde_json::from_str(body)
        .map_err(|e| OracleError::MalformedResponse(format!("hint list: {}", e)))?;
    Ok(records
        .into_iter()
        .map(|record| match record {
            HintRecord::Described { description } => description,
            HintRecord::Plain(text) => text,
        })
        .collect())
}

// ── Oracle ──────────────────────────────────────────────────────────

/// Oracle backed by two Gemini models: a fast one for diffs and a stronger
/// one for guidance and critique.
#[derive(Debug, Clone)]
pub struct GeminiOracle {
    client: GeminiClient,
    mutation_model: String,
    critique_model: String,
    diff: DiffApplier,
}

impl GeminiOracle {
    pub fn new(
        client: GeminiClient,
        mutation_model: impl Into<String>,
        critique_model: impl Into<String>,
    ) -> OracleResult<Self> {
        Ok(Self {
            client,
            mutation_model: mutation_model.into(),
            critique_model: critique_model.into(),
            diff: DiffApplier::new()?,
        })
    }

    async fn hints(&self, prompt: &str, existing_hints: &[String]) -> OracleResult<Vec<String>> {
        let raw = self.client.generate(&self.critique_model, prompt, true).await?;
        Ok(dedupe_hints(parse_hints(&raw)?, existing_hints))
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn refine_guidance(
        &self,
        previous: &str,
        parent_program: &str,
        hint: &str,
    ) -> OracleResult<String> {
        let prompt = PromptBuilder::refine_guidance(previous, parent_program, hint);
        self.client.generate(&self.critique_model, &prompt, false).await
    }

    async fn mutate(&self, parent_program: &str, guidance: &str) -> OracleResult<String> {
        let prompt = PromptBuilder::mutation(parent_program, guidance);
        let reply = self.client.generate(&self.mutation_model, &prompt, false).await?;
        let applied = self.diff.apply(parent_program, &reply);
        debug!(
            blocks_found = applied.blocks_found,
            blocks_applied = applied.blocks_applied,
            "applied mutation diff"
        );
        Ok(applied.program)
    }

    async fn critique_regression(
        &self,
        regression: &Regression<'_>,
        existing_hints: &[String],
    ) -> OracleResult<Vec<String>> {
        let prompt = PromptBuilder::regression(regression, existing_hints);
        self.hints(&prompt, existing_hints).await
    }

    async fn critique_outcome(
        &self,
        guidance: &str,
        program: &str,
        outcome: &Outcome,
        existing_hints: &[String],
    ) -> OracleResult<Vec<String>> {
        let prompt = PromptBuilder::outcome(guidance, program, outcome, existing_hints);
        self.hints(&prompt, existing_hints).await
    }

    fn name(&self) -> &str {
        "gemini-oracle"
    }
}

// ── Embedding ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeminiEmbedding {
    client: GeminiClient,
    model: String,
}

impl GeminiEmbedding {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingSpace for GeminiEmbedding {
    async fn embed(&self, program: &str) -> OracleResult<Vec<f64>> {
        self.client.embed(&self.model, program).await
    }

    fn name(&self) -> &str {
        "gemini-embedding"
    }
}
