// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;

use crate::errors::SaverError;
use crate::saver::GenerationResult;
use crate::traits::CodeSaver;
use crate::workflow::GenerationType;

pub const INDEX_FILE: &str = "index.html";

/// Writes a single page to `index.html`.
pub struct HtmlSaver;

impl CodeSaver for HtmlSaver {
    fn validate_input(&self, result: &GenerationResult) -> Result<(), SaverError> {
        match result {
            GenerationResult::Html { html } if html.trim().is_empty() => Err(
                SaverError::ContentValidation("HTML content is blank".to_string()),
            ),
            GenerationResult::Html { .. } => Ok(()),
            other => Err(SaverError::ContentValidation(format!(
                "HTML saver cannot persist a {} result",
                other.shape()
            ))),
        }
    }

    fn save_files(&self, result: &GenerationResult, base_dir: &Path) -> Result<(), SaverError> {
        match result {
            GenerationResult::Html { html } => Ok(std::fs::write(base_dir.join(INDEX_FILE), html)?),
            other => Err(SaverError::ContentValidation(format!(
                "HTML saver cannot persist a {} result",
                other.shape()
            ))),
        }
    }

    fn code_type(&self) -> GenerationType {
        GenerationType::Html
    }
}
