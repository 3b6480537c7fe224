// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for artifact persistence.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Generated code written to its output directory.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ArtifactSaved<'a> {
    pub generation_type: &'a str,
    pub dir: &'a str,
    pub file_count: usize,
}

impl Display for ArtifactSaved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Saved {} files for {} generation to {}",
            self.file_count, self.generation_type, self.dir
        )
    }
}

impl StructuredLog for ArtifactSaved<'_> {
    fn log(&self) {
        tracing::info!(
            generation_type = self.generation_type,
            dir = self.dir,
            file_count = self.file_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "artifact_saved",
            span_name = name,
            generation_type = self.generation_type,
            dir = self.dir,
        )
    }
}

/// The saver refused a result before touching the filesystem.
///
/// # Log Level
/// `warn!` - Invalid generation output
pub struct ArtifactRejected<'a> {
    pub generation_type: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ArtifactRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected {} generation result: {}",
            self.generation_type, self.error
        )
    }
}

impl StructuredLog for ArtifactRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            generation_type = self.generation_type,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "artifact_rejected",
            span_name = name,
            generation_type = self.generation_type,
        )
    }
}
