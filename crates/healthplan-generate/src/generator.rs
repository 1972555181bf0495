//! The `TextGenerator` seam and its implementations.
//!
//! - `LlmGenerator`: a configured external provider.
//! - `NoopGenerator`: no provider configured; every call fails so callers
//!   take their deterministic fallback.
//! - `StaticGenerator`: replays a fixed reply (offline replay, tests).

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::{debug, warn};

use healthplan_core::{Error, Result};

use crate::config::LLMConfig;
use crate::providers;
use crate::types::{ChatMessage, GenerationParams, ResolvedProvider};

const SYSTEM_PROMPT: &str = "You are a clinical nutrition data assistant. \
Reply with a single JSON object and nothing else.";

/// External text-generation service: free-text prompt in, free text out.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Identifier for logs.
    fn name(&self) -> &str;
}

/// Run one generation attempt under a fixed timeout. No retries.
pub async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    prompt: &str,
    timeout: Duration,
) -> Result<String> {
    debug!(
        "Generating with {} ({} prompt chars, timeout {:?})",
        generator.name(),
        prompt.len(),
        timeout
    );
    match tokio::time::timeout(timeout, generator.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{} timed out after {:?}", generator.name(), timeout);
            Err(Error::Timeout(timeout.as_millis() as u64))
        }
    }
}

/// Generator backed by a configured external provider.
pub struct LlmGenerator {
    client: Client,
    resolved: ResolvedProvider,
    params: GenerationParams,
    label: String,
}

impl LlmGenerator {
    pub fn new(resolved: ResolvedProvider) -> Self {
        let label = format!("{}:{}", resolved.provider, resolved.model);
        Self {
            client: Client::new(),
            resolved,
            params: GenerationParams::default(),
            label,
        }
    }

    /// Build from stored config; `None` when no provider resolves.
    pub fn from_config(config: &LLMConfig) -> Option<Self> {
        config.resolve_provider().map(Self::new)
    }
}

impl TextGenerator for LlmGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
            providers::complete(&self.client, &self.resolved, messages, self.params).await
        })
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Generator used when no provider is configured.
#[derive(Debug, Default)]
pub struct NoopGenerator;

impl TextGenerator for NoopGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async { Err(Error::Generation("No LLM provider configured".into())) })
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Generator that always returns the same reply.
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    reply: String,
    delay: Option<Duration>,
}

impl StaticGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            delay: None,
        }
    }

    /// Delay every reply (for exercising timeouts).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl TextGenerator for StaticGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.reply.clone())
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}
