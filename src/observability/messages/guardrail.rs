// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A prompt was refused before any model call.
///
/// # Log Level
/// `warn!` - Request refused
pub struct PromptRejected<'a> {
    pub session_id: &'a str,
    pub rule: &'a str,
    pub input_len: usize,
}

impl Display for PromptRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Prompt for session '{}' rejected by rule '{}' ({} chars)",
            self.session_id, self.rule, self.input_len
        )
    }
}

impl StructuredLog for PromptRejected<'_> {
    fn log(&self) {
        // Never log the prompt itself; it may be the payload being refused.
        tracing::warn!(
            session_id = self.session_id,
            rule = self.rule,
            input_len = self.input_len,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "prompt_rejected",
            span_name = name,
            session_id = self.session_id,
            rule = self.rule,
        )
    }
}
