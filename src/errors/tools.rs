// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while executing model-issued file operations.
//!
//! None of these abort a workflow. The tool loop reports them back into the
//! model's conversation as a failed tool result so the model can adapt.

use crate::utils::path_guard::PathViolation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolExecutionError {
    /// The target file does not exist inside the sandbox.
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// `modify` precondition failed: the file's current content is not `oldContent`.
    #[error("Conflict: current content of '{path}' does not match oldContent; file left unchanged")]
    Conflict { path: String },

    /// The relative path resolves outside the sandbox root.
    #[error(transparent)]
    PathViolation(#[from] PathViolation),

    /// A required argument for the tool is absent.
    #[error("Tool '{tool}' requires argument '{argument}'")]
    MissingArgument {
        tool: &'static str,
        argument: &'static str,
    },

    /// The tool-call arguments are not valid invocation JSON.
    #[error("Malformed tool arguments: {0}")]
    MalformedArguments(String),

    /// Filesystem failure other than a missing file.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolExecutionError {
    /// Short machine-friendly kind, used in audit lines and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolExecutionError::FileNotFound { .. } => "file_not_found",
            ToolExecutionError::Conflict { .. } => "conflict",
            ToolExecutionError::PathViolation(_) => "path_violation",
            ToolExecutionError::MissingArgument { .. } => "missing_argument",
            ToolExecutionError::MalformedArguments(_) => "malformed_arguments",
            ToolExecutionError::Io { .. } => "io",
        }
    }
}
