// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Core types for the model service boundary.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Why a model call is made. Used for logging and by test doubles to script replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    ImageCollection,
    Routing,
    CodeGeneration,
    QualityCheck,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::ImageCollection => "image_collection",
            Purpose::Routing => "routing",
            Purpose::CodeGeneration => "code_generation",
            Purpose::QualityCheck => "quality_check",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A model-issued tool call. `arguments` is the raw JSON text as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant turn, echoing back any tool calls it made.
    pub fn assistant(turn: &ModelTurn) -> Self {
        Self {
            role: Role::Assistant,
            content: turn.content.clone(),
            tool_calls: turn.tool_calls.clone(),
            tool_call_id: None,
        }
    }

    /// Result of one tool call, addressed to the call that produced it.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool offered to the model, described by a JSON schema for its arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub const FILE_OPERATION: &'static str = "file_operation";

    /// The single file tool offered during project generation.
    pub fn file_operation() -> Self {
        Self {
            name: Self::FILE_OPERATION.to_string(),
            description: "Read, write, modify or delete a file inside the project directory. \
                          Paths are relative to the project root."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "toolName": { "type": "string", "enum": ["read", "write", "modify", "delete"] },
                    "relativeFilePath": { "type": "string" },
                    "content": { "type": "string", "description": "Full file content for write" },
                    "oldContent": { "type": "string", "description": "Exact current file content for modify" },
                    "newContent": { "type": "string", "description": "Replacement file content for modify" }
                },
                "required": ["toolName", "relativeFilePath"]
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub purpose: Purpose,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    /// Push content deltas to the sink as they arrive.
    pub stream: bool,
    pub response_format: ResponseFormat,
}

impl ModelRequest {
    pub fn new(purpose: Purpose, messages: Vec<Message>) -> Self {
        Self {
            purpose,
            messages,
            tools: Vec::new(),
            stream: false,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.response_format = ResponseFormat::Json;
        self
    }
}

/// One model answer: free text plus any tool calls it requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelTurn {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = calls;
        self
    }
}
