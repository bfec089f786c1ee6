// src/oracle/ollama.rs

//! [`Oracle`] backed by a local Ollama server (`POST /api/generate`).

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::OracleConfig;

use super::parse::parse_response;
use super::prompts;
use super::types::{
    AnalysisRequest, ExecutionPlan, PlanRequest, ScheduleRequest, ScheduleSuggestion, TaskAnalysis,
};
use super::{Oracle, OracleFuture};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Clone)]
pub struct OllamaOracle {
    client: reqwest::Client,
    url: String,
    model: String,
    unload_after_use: bool,
}

impl OllamaOracle {
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("building HTTP client for oracle")?;

        let url = format!("{}/api/generate", config.endpoint.trim_end_matches('/'));
        info!(url = %url, model = %config.model, "oracle configured");

        Ok(Self {
            client,
            url,
            model: config.model.clone(),
            unload_after_use: config.unload_after_use,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            // keep_alive = 0 asks the server to unload the model after answering.
            keep_alive: self.unload_after_use.then_some(0),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("calling oracle at {}", self.url))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("oracle returned {status}: {text}");
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .context("reading oracle response body")?;
        debug!(chars = payload.response.len(), "oracle responded");
        Ok(payload.response)
    }

    async fn ask<T: DeserializeOwned>(&self, prompt: String) -> Result<T> {
        let raw = self.generate(&prompt).await?;
        parse_response(&raw)
    }
}

impl Oracle for OllamaOracle {
    fn analyze(&self, request: AnalysisRequest) -> OracleFuture<'_, TaskAnalysis> {
        Box::pin(async move { self.ask(prompts::analysis_prompt(&request)).await })
    }

    fn plan(&self, request: PlanRequest) -> OracleFuture<'_, ExecutionPlan> {
        Box::pin(async move { self.ask(prompts::plan_prompt(&request)).await })
    }

    fn schedule(&self, request: ScheduleRequest) -> OracleFuture<'_, ScheduleSuggestion> {
        Box::pin(async move { self.ask(prompts::schedule_prompt(&request)).await })
    }
}
