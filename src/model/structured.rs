// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed parsing of structured model answers.
//!
//! Models often wrap JSON in a code fence or add a sentence around it. The
//! parser strips a fence if present, then takes the outermost JSON object or
//! array and deserializes it into the requested type.

use serde::de::DeserializeOwned;

use crate::errors::ModelError;

/// Locate the JSON payload inside a model answer.
pub fn extract_json(raw: &str) -> Option<&str> {
    let mut text = raw.trim();

    if let Some(start) = text.find("```") {
        let after_fence = &text[start + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            text = body[..end].trim();
        }
    }

    let open = text.find(|c| c == '{' || c == '[')?;
    let close_char = if text[open..].starts_with('{') { '}' } else { ']' };
    let close = text.rfind(close_char)?;
    (close > open).then(|| &text[open..=close])
}

pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ModelError> {
    let payload = extract_json(raw).ok_or_else(|| {
        ModelError::InvalidResponse(format!("no JSON payload in answer: {}", preview(raw)))
    })?;
    serde_json::from_str(payload).map_err(|e| {
        ModelError::InvalidResponse(format!("{} in answer: {}", e, preview(raw)))
    })
}

fn preview(raw: &str) -> String {
    const MAX: usize = 120;
    let mut out: String = raw.chars().take(MAX).collect();
    if raw.chars().count() > MAX {
        out.push('…');
    }
    out
}
