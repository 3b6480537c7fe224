// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Terminal error taxonomy for a generation workflow.
//!
//! Every variant maps onto a stable integer [`ErrorCode`] that is sent to the
//! caller in the `business-error` stream event.

use std::time::Duration;
use thiserror::Error;

use crate::errors::{ModelError, SaverError, ToolExecutionError};

/// Wire-stable error codes carried by `business-error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    ParamsError = 40000,
    TooManyRequest = 42900,
    SystemError = 50000,
    OperationError = 50001,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The guardrail refused the raw prompt. No model call was made.
    #[error("Input rejected: {0}")]
    InputRejected(String),

    #[error("Invalid session id: {0}")]
    InvalidSession(String),

    /// Another execution already owns this session's sandbox.
    #[error("Session '{0}' already has a generation in progress")]
    SessionBusy(String),

    /// Routing produced a value outside the closed generation-type set.
    #[error("Classification error: model answered '{raw}', which is not a known generation type")]
    Classification { raw: String },

    /// Generic stage failure.
    #[error("Stage '{stage}' failed: {message}")]
    StageFailure { stage: String, message: String },

    /// A model round-trip exceeded its bounded wait.
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation cancelled")]
    Cancelled,

    /// A stage tried to overwrite a context field it does not own.
    #[error("Context error: {0}")]
    Context(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Save(#[from] SaverError),

    #[error(transparent)]
    Tool(#[from] ToolExecutionError),
}

impl WorkflowError {
    pub fn stage_failure(stage: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::StageFailure {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::InputRejected(_) | WorkflowError::InvalidSession(_) => {
                ErrorCode::ParamsError
            }
            WorkflowError::SessionBusy(_) => ErrorCode::TooManyRequest,
            WorkflowError::Classification { .. } | WorkflowError::Cancelled => {
                ErrorCode::OperationError
            }
            WorkflowError::Save(SaverError::ContentValidation(_))
            | WorkflowError::Save(SaverError::PathViolation(_)) => ErrorCode::OperationError,
            WorkflowError::StageFailure { .. }
            | WorkflowError::Timeout(_)
            | WorkflowError::Context(_)
            | WorkflowError::Model(_)
            | WorkflowError::Save(_)
            | WorkflowError::Tool(_) => ErrorCode::SystemError,
        }
    }

    pub fn is_content_validation(&self) -> bool {
        matches!(self, WorkflowError::Save(SaverError::ContentValidation(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let cases = vec![
            (WorkflowError::InputRejected("x".into()), 40000),
            (WorkflowError::SessionBusy("s".into()), 42900),
            (WorkflowError::Classification { raw: "php".into() }, 50001),
            (
                WorkflowError::Save(SaverError::ContentValidation("blank".into())),
                50001,
            ),
            (WorkflowError::stage_failure("router", "boom"), 50000),
            (WorkflowError::Timeout(Duration::from_secs(1)), 50000),
        ];

        for (error, expected) in cases {
            assert_eq!(error.code().as_i32(), expected, "wrong code for {}", error);
        }
    }
}
