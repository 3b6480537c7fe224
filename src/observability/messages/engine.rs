// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow execution and stage lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Workflow execution lifecycle (start, completion, failure, cancellation)
//! * Stage lifecycle inside one execution
//! * Quality-driven regeneration passes

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Workflow execution started for a session.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_codesmith::observability::messages::engine::WorkflowStarted;
///
/// let msg = WorkflowStarted {
///     session_id: "s-1",
///     prompt_len: 42,
///     stage_count: 5,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct WorkflowStarted<'a> {
    pub session_id: &'a str,
    pub prompt_len: usize,
    pub stage_count: usize,
}

impl Display for WorkflowStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting generation workflow for session '{}': {} stages, prompt of {} chars",
            self.session_id, self.stage_count, self.prompt_len
        )
    }
}

impl StructuredLog for WorkflowStarted<'_> {
    fn log(&self) {
        tracing::info!(
            session_id = self.session_id,
            prompt_len = self.prompt_len,
            stage_count = self.stage_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow",
            span_name = name,
            session_id = self.session_id,
            prompt_len = self.prompt_len,
            stage_count = self.stage_count,
        )
    }
}

/// Workflow execution completed with a build result.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkflowCompleted<'a> {
    pub session_id: &'a str,
    pub generation_type: &'a str,
    pub build_result_dir: &'a str,
    pub duration: Duration,
}

impl Display for WorkflowCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generation workflow for session '{}' completed as {} in {:?}: {}",
            self.session_id, self.generation_type, self.duration, self.build_result_dir
        )
    }
}

impl StructuredLog for WorkflowCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            session_id = self.session_id,
            generation_type = self.generation_type,
            build_result_dir = self.build_result_dir,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow_completed",
            span_name = name,
            session_id = self.session_id,
            generation_type = self.generation_type,
            duration = ?self.duration,
        )
    }
}

/// Workflow execution ended with a terminal error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkflowFailed<'a> {
    pub session_id: &'a str,
    pub code: i32,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkflowFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generation workflow for session '{}' failed ({}): {}",
            self.session_id, self.code, self.error
        )
    }
}

impl StructuredLog for WorkflowFailed<'_> {
    fn log(&self) {
        tracing::error!(
            session_id = self.session_id,
            code = self.code,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "workflow_failed",
            span_name = name,
            session_id = self.session_id,
            code = self.code,
        )
    }
}

/// A stop signal ended the execution.
///
/// # Log Level
/// `warn!` - Caller-initiated interruption
pub struct WorkflowCancelled<'a> {
    pub session_id: &'a str,
    pub stage: &'a str,
}

impl Display for WorkflowCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generation workflow for session '{}' cancelled during stage '{}'",
            self.session_id, self.stage
        )
    }
}

impl StructuredLog for WorkflowCancelled<'_> {
    fn log(&self) {
        tracing::warn!(session_id = self.session_id, stage = self.stage, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "workflow_cancelled",
            span_name = name,
            session_id = self.session_id,
            stage = self.stage,
        )
    }
}

/// Stage started.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct StageStarted<'a> {
    pub session_id: &'a str,
    pub stage: &'a str,
    pub step_number: usize,
}

impl Display for StageStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running stage '{}' (step {}) for session '{}'",
            self.stage, self.step_number, self.session_id
        )
    }
}

impl StructuredLog for StageStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            session_id = self.session_id,
            stage = self.stage,
            step_number = self.step_number,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "stage",
            span_name = name,
            session_id = self.session_id,
            stage = self.stage,
            step_number = self.step_number,
        )
    }
}

/// Stage completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StageCompleted<'a> {
    pub session_id: &'a str,
    pub stage: &'a str,
    pub duration: Duration,
}

impl Display for StageCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' completed for session '{}' in {:?}",
            self.stage, self.session_id, self.duration
        )
    }
}

impl StructuredLog for StageCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            session_id = self.session_id,
            stage = self.stage,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "stage_completed",
            span_name = name,
            session_id = self.session_id,
            stage = self.stage,
            duration = ?self.duration,
        )
    }
}

/// Stage failed; the execution stops here.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_codesmith::observability::messages::engine::StageFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = StageFailed {
///     session_id: "s-1",
///     stage: "code_generator",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct StageFailed<'a> {
    pub session_id: &'a str,
    pub stage: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' failed for session '{}': {}",
            self.stage, self.session_id, self.error
        )
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::error!(
            session_id = self.session_id,
            stage = self.stage,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "stage_failed",
            span_name = name,
            session_id = self.session_id,
            stage = self.stage,
        )
    }
}

/// The quality check rejected the code and generation is re-run.
///
/// # Log Level
/// `warn!` - Degraded output being retried
pub struct QualityRetry<'a> {
    pub session_id: &'a str,
    pub attempt: u32,
    pub max_retries: u32,
    pub error_count: usize,
}

impl Display for QualityRetry<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Quality check rejected generated code for session '{}' ({} problems); regenerating, attempt {}/{}",
            self.session_id, self.error_count, self.attempt, self.max_retries
        )
    }
}

impl StructuredLog for QualityRetry<'_> {
    fn log(&self) {
        tracing::warn!(
            session_id = self.session_id,
            attempt = self.attempt,
            max_retries = self.max_retries,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "quality_retry",
            span_name = name,
            session_id = self.session_id,
            attempt = self.attempt,
        )
    }
}

/// Retries are exhausted and the pipeline proceeds with code that failed review.
///
/// # Log Level
/// `warn!` - Degraded output accepted
pub struct QualityRetriesExhausted<'a> {
    pub session_id: &'a str,
    pub max_retries: u32,
    pub error_count: usize,
}

impl Display for QualityRetriesExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Quality check still reports {} problems for session '{}' after {} retries; proceeding",
            self.error_count, self.session_id, self.max_retries
        )
    }
}

impl StructuredLog for QualityRetriesExhausted<'_> {
    fn log(&self) {
        tracing::warn!(
            session_id = self.session_id,
            max_retries = self.max_retries,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "quality_retries_exhausted",
            span_name = name,
            session_id = self.session_id,
        )
    }
}
