// ============================================================
// Layer 2 — Invoke Use Case
// ============================================================
// Reads a JSON payload from disk and posts it to a running
// model-serving endpoint. The answer is passed back untouched.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::infra::invocation_client::{InvocationClient, InvocationResponse, DEFAULT_ENDPOINT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeConfig {
    pub url:   String,
    pub input: String,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self { url: DEFAULT_ENDPOINT.to_string(), input: "input.json".to_string() }
    }
}

pub struct InvokeUseCase {
    config: InvokeConfig,
}

impl InvokeUseCase {
    pub fn new(config: InvokeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<InvocationResponse> {
        let text = fs::read_to_string(&self.config.input)
            .with_context(|| format!("Cannot read payload file '{}'", self.config.input))?;
        let payload: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("'{}' is not valid JSON", self.config.input))?;

        let client = InvocationClient::new(&self.config.url)?;
        client.invoke(&payload)
    }
}
