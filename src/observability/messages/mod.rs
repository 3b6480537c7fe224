// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit that line at its own level together with
//! machine-readable fields.
//!
//! # Organization
//!
//! * `engine` - Workflow execution and stage lifecycle events
//! * `stages` - Stage-specific decisions
//! * `tools` - Sandbox file operation events
//! * `saver` - Artifact persistence events
//! * `guardrail` - Input rejection events
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_codesmith::observability::messages::{engine::StageStarted, StructuredLog};
//!
//! let msg = StageStarted {
//!     session_id: "s-1",
//!     stage: "router",
//!     step_number: 3,
//! };
//!
//! let span = msg.span("stage");
//! let _guard = span.enter();
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod guardrail;
pub mod saver;
pub mod stages;
pub mod tools;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with structured fields.
    fn log(&self);

    /// Open a span carrying the same fields as the message.
    fn span(&self, name: &str) -> Span;
}
