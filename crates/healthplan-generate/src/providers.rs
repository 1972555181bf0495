//! Provider HTTP calls.
//!
//! Replies are streamed via SSE and collected into one string. OpenAI and
//! Groq share a wire format; Anthropic uses its own.

use std::pin::Pin;

use futures::Stream;
use reqwest::Client;
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::{debug, error};

use healthplan_core::{Error, Result};

use crate::types::{ChatMessage, GenerationParams, LLMProvider, ResolvedProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
pub enum StreamChunk {
    Token(String),
    Done,
    Error(String),
}

/// Stream tokens from the resolved provider.
pub fn stream_llm(
    client: &Client,
    resolved: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    params: GenerationParams,
) -> BoxedStream {
    match resolved.provider {
        LLMProvider::OpenAI => Box::pin(stream_openai_compat(
            client.clone(),
            OPENAI_URL,
            messages,
            resolved.clone(),
            params,
        )),
        LLMProvider::Groq => Box::pin(stream_openai_compat(
            client.clone(),
            GROQ_URL,
            messages,
            resolved.clone(),
            params,
        )),
        LLMProvider::Anthropic => Box::pin(stream_anthropic(
            client.clone(),
            messages,
            resolved.clone(),
            params,
        )),
    }
}

/// Collect a streamed reply into one string.
pub async fn complete(
    client: &Client,
    resolved: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    params: GenerationParams,
) -> Result<String> {
    let stream = stream_llm(client, resolved, messages, params);
    tokio::pin!(stream);

    let mut reply = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(text) => reply.push_str(&text),
            StreamChunk::Done => break,
            StreamChunk::Error(e) => return Err(Error::Generation(e)),
        }
    }

    if reply.trim().is_empty() {
        return Err(Error::Generation(format!(
            "{} returned an empty reply",
            resolved.provider
        )));
    }
    Ok(reply)
}

/// Drain complete SSE lines from `buffer`, returning their `data:` payloads.
fn drain_sse_data(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Some(line_end) = buffer.find('\n') {
        let line = buffer[..line_end].trim().to_string();
        buffer.drain(..=line_end);

        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(data) = line.strip_prefix("data:") {
            payloads.push(data.trim().to_string());
        }
    }
    payloads
}

/// Stream from OpenAI-compatible APIs (OpenAI, Groq).
fn stream_openai_compat(
    client: Client,
    url: &'static str,
    messages: Vec<ChatMessage>,
    resolved: ResolvedProvider,
    params: GenerationParams,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    let msgs: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    async_stream::stream! {
        let body = json!({
            "model": resolved.model,
            "messages": msgs,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "stream": true,
        });

        debug!("Requesting {} with model {}", url, resolved.model);

        let response = match client
            .post(url)
            .header("Authorization", format!("Bearer {}", resolved.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            for data in drain_sse_data(&mut buffer) {
                if data == "[DONE]" {
                    yield StreamChunk::Done;
                    return;
                }
                if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&data) {
                    if let Some(content) = parsed["choices"][0]["delta"]["content"].as_str() {
                        if !content.is_empty() {
                            yield StreamChunk::Token(content.to_string());
                        }
                    }
                }
            }
        }

        yield StreamChunk::Done;
    }
}

/// Stream from Anthropic's Messages API.
fn stream_anthropic(
    client: Client,
    messages: Vec<ChatMessage>,
    resolved: ResolvedProvider,
    params: GenerationParams,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    let system_msg: Option<String> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.clone());

    let conv_msgs: Vec<serde_json::Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    async_stream::stream! {
        let mut body = json!({
            "model": resolved.model,
            "messages": conv_msgs,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "stream": true,
        });

        if let Some(sys) = system_msg {
            body["system"] = json!(sys);
        }

        debug!("Requesting Anthropic with model {}", resolved.model);

        let response = match client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &resolved.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            for data in drain_sse_data(&mut buffer) {
                let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&data) else {
                    continue;
                };
                match parsed["type"].as_str() {
                    Some("content_block_delta") => {
                        if let Some(text) = parsed["delta"]["text"].as_str() {
                            if !text.is_empty() {
                                yield StreamChunk::Token(text.to_string());
                            }
                        }
                    }
                    Some("message_stop") => {
                        yield StreamChunk::Done;
                        return;
                    }
                    Some("error") => {
                        let msg = parsed["error"]["message"]
                            .as_str()
                            .unwrap_or("Unknown error");
                        error!("Anthropic error: {}", msg);
                        yield StreamChunk::Error(msg.to_string());
                        return;
                    }
                    _ => {}
                }
            }
        }

        yield StreamChunk::Done;
    }
}
