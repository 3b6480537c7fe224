// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for sandbox file operations requested by the model.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A file operation completed inside the sandbox.
///
/// # Log Level
/// `info!` - Audited mutation
pub struct ToolExecuted<'a> {
    pub tool: &'a str,
    pub path: &'a str,
    pub bytes: usize,
}

impl Display for ToolExecuted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Tool '{}' on '{}' succeeded ({} bytes)", self.tool, self.path, self.bytes)
    }
}

impl StructuredLog for ToolExecuted<'_> {
    fn log(&self) {
        tracing::info!(tool = self.tool, path = self.path, bytes = self.bytes, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("tool", span_name = name, tool = self.tool, path = self.path)
    }
}

/// A file operation was refused or failed. The failure is reported back to the model.
///
/// # Log Level
/// `warn!` - Recoverable; the model may retry
pub struct ToolRejected<'a> {
    pub tool: &'a str,
    pub path: &'a str,
    pub kind: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ToolRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Tool '{}' on '{}' failed with {}: {}",
            self.tool, self.path, self.kind, self.error
        )
    }
}

impl StructuredLog for ToolRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            tool = self.tool,
            path = self.path,
            kind = self.kind,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "tool_rejected",
            span_name = name,
            tool = self.tool,
            kind = self.kind,
        )
    }
}

/// One round of the project tool loop.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ToolRound<'a> {
    pub session_id: &'a str,
    pub round: usize,
    pub calls: usize,
}

impl Display for ToolRound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Tool round {} for session '{}': {} calls",
            self.round, self.session_id, self.calls
        )
    }
}

impl StructuredLog for ToolRound<'_> {
    fn log(&self) {
        tracing::debug!(
            session_id = self.session_id,
            round = self.round,
            calls = self.calls,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "tool_round",
            span_name = name,
            session_id = self.session_id,
            round = self.round,
        )
    }
}
