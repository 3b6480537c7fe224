// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared state threaded through every pipeline stage.
//!
//! A [`WorkflowContext`] is owned by exactly one execution. Its fields are
//! append-only: each `set_*` method refuses to overwrite a populated field and
//! returns [`WorkflowError::Context`] instead. The single sanctioned overwrite,
//! a quality-driven regeneration, goes through [`WorkflowContext::replace_generated_code_dir`]
//! which records its reason in the log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::WorkflowError;
use crate::traits::stage::StageName;

/// Output shape of a generation. Wire values are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    Html,
    MultiFile,
    VueProject,
    ReactProject,
}

impl GenerationType {
    pub const ALL: [GenerationType; 4] = [
        GenerationType::Html,
        GenerationType::MultiFile,
        GenerationType::VueProject,
        GenerationType::ReactProject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationType::Html => "html",
            GenerationType::MultiFile => "multi_file",
            GenerationType::VueProject => "vue_project",
            GenerationType::ReactProject => "react_project",
        }
    }

    /// Projects are generated through file tools and may need a build step.
    pub fn is_project(&self) -> bool {
        matches!(self, GenerationType::VueProject | GenerationType::ReactProject)
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenerationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageCategory {
    Content,
    Logo,
    Illustration,
    Architecture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResource {
    pub category: ImageCategory,
    pub description: String,
    pub url: String,
}

/// Validated session identifier: 1-64 characters of `[A-Za-z0-9_-]`.
///
/// Session ids name directories on disk, so anything else is refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub const MAX_LEN: usize = 64;

    pub fn parse(raw: &str) -> Result<Self, WorkflowError> {
        let valid = !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(WorkflowError::InvalidSession(format!(
                "'{}' must be 1-{} characters of letters, digits, '-' or '_'",
                raw,
                Self::MAX_LEN
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verdict of the optional code quality check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    #[serde(alias = "isValid")]
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WorkflowContext {
    session_id: SessionId,
    original_prompt: String,
    current_step: String,
    image_list: Option<Vec<ImageResource>>,
    enhanced_prompt: Option<String>,
    generation_type: Option<GenerationType>,
    generated_code_dir: Option<PathBuf>,
    quality_report: Option<QualityReport>,
    build_result_dir: Option<PathBuf>,
    error_message: Option<String>,
}

/// Refuse to overwrite an already-populated field.
fn set_once<T>(slot: &mut Option<T>, value: T, field: &str) -> Result<(), WorkflowError> {
    if slot.is_some() {
        return Err(WorkflowError::Context(format!(
            "field '{}' is already populated",
            field
        )));
    }
    *slot = Some(value);
    Ok(())
}

impl WorkflowContext {
    pub const INITIAL_STEP: &'static str = "initialized";

    pub fn new(session_id: SessionId, original_prompt: impl Into<String>) -> Self {
        Self {
            session_id,
            original_prompt: original_prompt.into(),
            current_step: Self::INITIAL_STEP.to_string(),
            image_list: None,
            enhanced_prompt: None,
            generation_type: None,
            generated_code_dir: None,
            quality_report: None,
            build_result_dir: None,
            error_message: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn original_prompt(&self) -> &str {
        &self.original_prompt
    }

    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    pub fn image_list(&self) -> Option<&[ImageResource]> {
        self.image_list.as_deref()
    }

    pub fn enhanced_prompt(&self) -> Option<&str> {
        self.enhanced_prompt.as_deref()
    }

    pub fn generation_type(&self) -> Option<GenerationType> {
        self.generation_type
    }

    pub fn generated_code_dir(&self) -> Option<&Path> {
        self.generated_code_dir.as_deref()
    }

    pub fn quality_report(&self) -> Option<&QualityReport> {
        self.quality_report.as_ref()
    }

    pub fn build_result_dir(&self) -> Option<&Path> {
        self.build_result_dir.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_image_list(&mut self, images: Vec<ImageResource>) -> Result<(), WorkflowError> {
        set_once(&mut self.image_list, images, "image_list")
    }

    pub fn set_enhanced_prompt(&mut self, prompt: String) -> Result<(), WorkflowError> {
        set_once(&mut self.enhanced_prompt, prompt, "enhanced_prompt")
    }

    pub fn set_generation_type(&mut self, kind: GenerationType) -> Result<(), WorkflowError> {
        set_once(&mut self.generation_type, kind, "generation_type")
    }

    pub fn set_generated_code_dir(&mut self, dir: PathBuf) -> Result<(), WorkflowError> {
        set_once(&mut self.generated_code_dir, dir, "generated_code_dir")
    }

    /// Overwrite the generated code directory for an explicit, logged reason.
    pub fn replace_generated_code_dir(&mut self, dir: PathBuf, reason: &str) {
        tracing::info!(
            session_id = %self.session_id,
            previous = ?self.generated_code_dir,
            new = %dir.display(),
            reason,
            "Replacing generated code directory"
        );
        self.generated_code_dir = Some(dir);
    }

    /// Quality reports are re-evaluated on each regeneration pass, so the latest one wins.
    pub fn record_quality_report(&mut self, report: QualityReport) {
        self.quality_report = Some(report);
    }

    pub fn set_build_result_dir(&mut self, dir: PathBuf) -> Result<(), WorkflowError> {
        set_once(&mut self.build_result_dir, dir, "build_result_dir")
    }

    pub(crate) fn mark_step(&mut self, stage: StageName) {
        self.current_step = stage.as_str().to_string();
    }

    /// Record the first failure. Later failures never overwrite it.
    pub(crate) fn mark_failed(&mut self, stage: StageName, message: String, incomplete: bool) {
        if incomplete {
            self.current_step = format!("{}:incomplete", stage.as_str());
        }
        if self.error_message.is_none() {
            self.error_message = Some(message);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.build_result_dir.is_some() && self.error_message.is_none()
    }
}
