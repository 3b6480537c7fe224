// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! OpenAI-compatible HTTP backend.
//!
//! Speaks `POST {base_url}/chat/completions`. Non-streamed requests parse a
//! single JSON body. Streamed requests parse server-sent events: content
//! deltas are forwarded to the sink as they arrive, tool-call fragments are
//! accumulated by index and assembled when the stream ends.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::ModelConfig;
use crate::errors::{ConfigError, ModelError};
use crate::model::types::{
    Message, ModelRequest, ModelTurn, ResponseFormat, Role, ToolCall, ToolSpec,
};
use crate::traits::ModelService;
use crate::workflow::EventSink;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct HttpParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for HttpParams {
    fn default() -> Self {
        Self {
            max_tokens: 8192,
            temperature: 0.2,
        }
    }
}

pub struct OpenAiCompatibleModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    params: HttpParams,
}

impl OpenAiCompatibleModel {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: String,
        params: HttpParams,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ModelError::Misconfiguration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model,
            params,
        })
    }

    /// Build the backend from configuration, reading the API key from the configured variable.
    pub fn from_config(cfg: &ModelConfig) -> Result<Self, ConfigError> {
        let api_key = std::env::var(&cfg.api_key_env)
            .map_err(|_| ConfigError::MissingApiKey(cfg.api_key_env.clone()))?;
        let params = HttpParams {
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        };
        Self::new(api_key, cfg.base_url.clone(), cfg.model.clone(), params)
            .map_err(|e| ConfigError::ModelClient(e.to_string()))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body<'a>(&'a self, request: &'a ModelRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            tools: request.tools.iter().map(WireTool::from).collect(),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            stream: request.stream,
            response_format: match request.response_format {
                ResponseFormat::Json if request.tools.is_empty() => {
                    Some(WireResponseFormat { kind: "json_object" })
                }
                _ => None,
            },
        }
    }

    async fn read_single(&self, response: reqwest::Response) -> Result<ModelTurn, ModelError> {
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Transport(format!("Failed to parse response: {}", e)))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("response missing choices[0]".into()))?;

        Ok(ModelTurn {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
        })
    }

    async fn read_stream(
        &self,
        response: reqwest::Response,
        sink: &EventSink,
    ) -> Result<ModelTurn, ModelError> {
        let mut accumulator = StreamAccumulator::default();
        let mut buffer: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ModelError::Transport(format!("stream read: {}", e)))?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                let line = String::from_utf8_lossy(&line);
                if accumulator.apply_line(line.trim_end(), sink)? {
                    return Ok(accumulator.finish());
                }
            }
        }

        if !buffer.is_empty() {
            let line = String::from_utf8_lossy(&buffer).into_owned();
            accumulator.apply_line(line.trim_end(), sink)?;
        }
        Ok(accumulator.finish())
    }
}

fn classify_status(status: reqwest::StatusCode, body: String) -> ModelError {
    let detail = format!("HTTP {}: {}", status.as_u16(), body);
    match status.as_u16() {
        401 | 403 => ModelError::ProviderAuth(detail),
        429 => ModelError::ProviderQuota(detail),
        500..=599 => ModelError::ProviderOutage(detail),
        _ => ModelError::Transport(detail),
    }
}

#[async_trait]
impl ModelService for OpenAiCompatibleModel {
    async fn chat(&self, request: ModelRequest, sink: &EventSink) -> Result<ModelTurn, ModelError> {
        debug!(
            provider = "openai-compatible",
            model = %self.model,
            purpose = request.purpose.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            stream = request.stream,
            "Invoking model"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.build_body(&request))
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let turn = if request.stream {
            self.read_stream(response, sink).await?
        } else {
            self.read_single(response).await?
        };

        debug!(
            provider = "openai-compatible",
            purpose = request.purpose.as_str(),
            content_len = turn.content.len(),
            tool_calls = turn.tool_calls.len(),
            "Model invocation completed"
        );
        Ok(turn)
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

/// Reassembles a streamed answer from `data:` lines.
#[derive(Default)]
struct StreamAccumulator {
    content: String,
    calls: BTreeMap<usize, PartialToolCall>,
}

#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl StreamAccumulator {
    /// Apply one SSE line. Returns `true` when the stream signalled completion.
    fn apply_line(&mut self, line: &str, sink: &EventSink) -> Result<bool, ModelError> {
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(false);
        };
        let data = data.trim();
        if data.is_empty() {
            return Ok(false);
        }
        if data == "[DONE]" {
            return Ok(true);
        }

        let chunk: StreamChunk = serde_json::from_str(data)
            .map_err(|e| ModelError::InvalidResponse(format!("bad stream chunk: {}", e)))?;

        for choice in chunk.choices {
            if let Some(text) = choice.delta.content {
                if !text.is_empty() {
                    sink.token(text.clone());
                    self.content.push_str(&text);
                }
            }
            for fragment in choice.delta.tool_calls {
                let call = self.calls.entry(fragment.index).or_default();
                if let Some(id) = fragment.id {
                    call.id = id;
                }
                if let Some(function) = fragment.function {
                    if let Some(name) = function.name {
                        call.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        call.arguments.push_str(&arguments);
                    }
                }
            }
        }
        Ok(false)
    }

    fn finish(self) -> ModelTurn {
        ModelTurn {
            content: self.content,
            tool_calls: self
                .calls
                .into_iter()
                .map(|(index, call)| ToolCall {
                    id: if call.id.is_empty() {
                        format!("call_{}", index)
                    } else {
                        call.id
                    },
                    name: call.name,
                    arguments: call.arguments,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

#[derive(Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: match message.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            },
            content: &message.content,
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: &call.id,
                    kind: "function",
                    function: WireFunction {
                        name: &call.name,
                        arguments: &call.arguments,
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct WireToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireToolFunction<'a>,
}

#[derive(Serialize)]
struct WireToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

impl<'a> From<&'a ToolSpec> for WireTool<'a> {
    fn from(spec: &'a ToolSpec) -> Self {
        Self {
            kind: "function",
            function: WireToolFunction {
                name: &spec.name,
                description: &spec.description,
                parameters: &spec.parameters,
            },
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ResponseToolCall>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Default, Deserialize)]
struct Delta {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<DeltaToolCall>,
}

#[derive(Deserialize)]
struct DeltaToolCall {
    index: usize,
    id: Option<String>,
    function: Option<DeltaFunction>,
}

#[derive(Deserialize)]
struct DeltaFunction {
    name: Option<String>,
    arguments: Option<String>,
}
