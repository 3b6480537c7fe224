// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ToolExecutionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolName {
    Read,
    Write,
    Modify,
    Delete,
}

impl ToolName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Read => "read",
            ToolName::Write => "write",
            ToolName::Modify => "modify",
            ToolName::Delete => "delete",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One model-issued file operation, as carried in the tool-call arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_name: ToolName,
    pub relative_file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
}

impl ToolInvocation {
    /// Parse the raw JSON arguments of a tool call.
    pub fn parse(arguments: &str) -> Result<Self, ToolExecutionError> {
        serde_json::from_str(arguments)
            .map_err(|e| ToolExecutionError::MalformedArguments(e.to_string()))
    }

    fn bare(tool_name: ToolName, path: &str) -> Self {
        Self {
            tool_name,
            relative_file_path: path.to_string(),
            content: None,
            old_content: None,
            new_content: None,
        }
    }

    pub fn read(path: &str) -> Self {
        Self::bare(ToolName::Read, path)
    }

    pub fn write(path: &str, content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            ..Self::bare(ToolName::Write, path)
        }
    }

    pub fn modify(path: &str, old_content: &str, new_content: &str) -> Self {
        Self {
            old_content: Some(old_content.to_string()),
            new_content: Some(new_content.to_string()),
            ..Self::bare(ToolName::Modify, path)
        }
    }

    pub fn delete(path: &str) -> Self {
        Self::bare(ToolName::Delete, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_schema() {
        let raw = r#"{"toolName":"modify","relativeFilePath":"src/App.vue","oldContent":"a","newContent":"b"}"#;
        let invocation = ToolInvocation::parse(raw).unwrap();
        assert_eq!(invocation, ToolInvocation::modify("src/App.vue", "a", "b"));
    }

    #[test]
    fn test_parse_rejects_unknown_tool() {
        let raw = r#"{"toolName":"chmod","relativeFilePath":"x"}"#;
        let err = ToolInvocation::parse(raw).unwrap_err();
        assert_eq!(err.kind(), "malformed_arguments");
    }
}
