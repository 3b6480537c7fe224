// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout The Codesmith. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between log lines and spans
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - Workflow execution and stage lifecycle events
//! * `messages::stages` - Stage-specific decisions (routing fallback, builds, degraded answers)
//! * `messages::tools` - Sandbox file operation events
//! * `messages::saver` - Artifact persistence events
//! * `messages::guardrail` - Input rejection events
//!
//! # Usage
//!
//! ```rust
//! use the_codesmith::observability::messages::{engine::StageFailed, StructuredLog};
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! StageFailed {
//!     session_id: "s-1",
//!     stage: "router",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;
