// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for decisions taken inside individual stages.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A best-effort model answer could not be parsed and a neutral value was used instead.
///
/// # Log Level
/// `warn!` - Degraded output accepted
pub struct DegradedAnswer<'a> {
    pub stage: &'a str,
    pub fallback: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DegradedAnswer<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' could not parse the model answer, using {}: {}",
            self.stage, self.fallback, self.error
        )
    }
}

impl StructuredLog for DegradedAnswer<'_> {
    fn log(&self) {
        tracing::warn!(
            stage = self.stage,
            fallback = self.fallback,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("degraded_answer", span_name = name, stage = self.stage)
    }
}

/// Routing answered outside the closed set and the configured fallback type was used.
///
/// # Log Level
/// `warn!` - Policy-driven substitution
pub struct RoutingFallback<'a> {
    pub raw: &'a str,
    pub fallback: &'a str,
}

impl Display for RoutingFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Router answered unknown type '{}'; falling back to '{}'",
            self.raw, self.fallback
        )
    }
}

impl StructuredLog for RoutingFallback<'_> {
    fn log(&self) {
        tracing::warn!(raw = self.raw, fallback = self.fallback, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("routing_fallback", span_name = name, fallback = self.fallback)
    }
}

/// A project build command finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BuildCommandCompleted<'a> {
    pub command: &'a str,
    pub dir: &'a str,
    pub duration: Duration,
}

impl Display for BuildCommandCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Build command '{}' completed in {} after {:?}",
            self.command, self.dir, self.duration
        )
    }
}

impl StructuredLog for BuildCommandCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            command = self.command,
            dir = self.dir,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "build_command",
            span_name = name,
            command = self.command,
            dir = self.dir,
        )
    }
}
