// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandbox-confined execution of file operations.
//!
//! Every path is confined to the executor's root before any filesystem
//! access; see [`crate::utils::path_guard`]. A `modify` only applies when the
//! file's whole current content equals `oldContent`; otherwise it fails with
//! [`ToolExecutionError::Conflict`] and the file is left untouched.

use std::io;
use std::path::{Path, PathBuf};

use crate::errors::ToolExecutionError;
use crate::model::{ToolCall, ToolSpec};
use crate::observability::messages::{
    tools::{ToolExecuted, ToolRejected},
    StructuredLog,
};
use crate::tools::audit;
use crate::tools::invocation::{ToolInvocation, ToolName};
use crate::utils::path_guard::{canonical_root, resolve_within};

/// Result of one successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Text returned to the model as the tool result.
    pub for_model: String,
    /// Line forwarded to observers.
    pub audit: String,
}

/// Outcome of one tool call, successful or not, ready to feed back to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    pub call_id: String,
    pub for_model: String,
    pub audit: String,
    pub succeeded: bool,
}

pub struct ToolExecutor {
    root: PathBuf,
}

fn io_error(path: &str, source: io::Error) -> ToolExecutionError {
    if source.kind() == io::ErrorKind::NotFound {
        ToolExecutionError::FileNotFound {
            path: path.to_string(),
        }
    } else {
        ToolExecutionError::Io {
            path: path.to_string(),
            source,
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    tool: &'static str,
    argument: &'static str,
) -> Result<&'a str, ToolExecutionError> {
    value
        .as_deref()
        .ok_or(ToolExecutionError::MissingArgument { tool, argument })
}

impl ToolExecutor {
    /// Create the sandbox root if needed and confine all operations to it.
    pub fn new(root: &Path) -> io::Result<Self> {
        Ok(Self {
            root: canonical_root(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn execute(
        &self,
        invocation: &ToolInvocation,
    ) -> Result<ToolOutput, ToolExecutionError> {
        let path = invocation.relative_file_path.as_str();
        let target = resolve_within(&self.root, path)?;

        match invocation.tool_name {
            ToolName::Read => {
                let content = read_file(&target, path).await?;
                Ok(ToolOutput {
                    audit: audit::read(path),
                    for_model: content,
                })
            }
            ToolName::Write => {
                let content = required(&invocation.content, "write", "content")?;
                write_file(&target, path, content).await?;
                let text = audit::write(path, content);
                Ok(ToolOutput {
                    for_model: text.clone(),
                    audit: text,
                })
            }
            ToolName::Modify => {
                let old_content = required(&invocation.old_content, "modify", "oldContent")?;
                let new_content = required(&invocation.new_content, "modify", "newContent")?;
                let current = read_file(&target, path).await?;
                if current != old_content {
                    return Err(ToolExecutionError::Conflict {
                        path: path.to_string(),
                    });
                }
                write_file(&target, path, new_content).await?;
                let text = audit::modify(path, old_content, new_content);
                Ok(ToolOutput {
                    for_model: text.clone(),
                    audit: text,
                })
            }
            ToolName::Delete => {
                let metadata = tokio::fs::symlink_metadata(&target)
                    .await
                    .map_err(|e| io_error(path, e))?;
                if metadata.is_dir() {
                    return Err(ToolExecutionError::FileNotFound {
                        path: path.to_string(),
                    });
                }
                tokio::fs::remove_file(&target)
                    .await
                    .map_err(|e| io_error(path, e))?;
                let text = audit::delete(path);
                Ok(ToolOutput {
                    for_model: text.clone(),
                    audit: text,
                })
            }
        }
    }

    /// Execute one model tool call. Failures become a failed report, never an error.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolReport {
        if call.name != ToolSpec::FILE_OPERATION {
            let text = format!(
                "[tool] unknown tool '{}'; the only available tool is '{}'",
                call.name,
                ToolSpec::FILE_OPERATION
            );
            return ToolReport {
                call_id: call.id.clone(),
                for_model: text.clone(),
                audit: text,
                succeeded: false,
            };
        }

        let invocation = match ToolInvocation::parse(&call.arguments) {
            Ok(invocation) => invocation,
            Err(error) => return self.failed(call, "file_operation", "?", error),
        };

        match self.execute(&invocation).await {
            Ok(output) => {
                ToolExecuted {
                    tool: invocation.tool_name.as_str(),
                    path: &invocation.relative_file_path,
                    bytes: output.for_model.len(),
                }
                .log();
                ToolReport {
                    call_id: call.id.clone(),
                    for_model: output.for_model,
                    audit: output.audit,
                    succeeded: true,
                }
            }
            Err(error) => self.failed(
                call,
                invocation.tool_name.as_str(),
                &invocation.relative_file_path,
                error,
            ),
        }
    }

    fn failed(&self, call: &ToolCall, tool: &str, path: &str, error: ToolExecutionError) -> ToolReport {
        ToolRejected {
            tool,
            path,
            kind: error.kind(),
            error: &error,
        }
        .log();
        let text = audit::failure(tool, path, &error);
        ToolReport {
            call_id: call.id.clone(),
            for_model: text.clone(),
            audit: text,
            succeeded: false,
        }
    }
}

async fn read_file(target: &Path, path: &str) -> Result<String, ToolExecutionError> {
    let metadata = tokio::fs::metadata(target)
        .await
        .map_err(|e| io_error(path, e))?;
    if !metadata.is_file() {
        return Err(ToolExecutionError::FileNotFound {
            path: path.to_string(),
        });
    }
    tokio::fs::read_to_string(target)
        .await
        .map_err(|e| io_error(path, e))
}

async fn write_file(target: &Path, path: &str, content: &str) -> Result<(), ToolExecutionError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(path, e))?;
    }
    tokio::fs::write(target, content)
        .await
        .map_err(|e| io_error(path, e))
}
