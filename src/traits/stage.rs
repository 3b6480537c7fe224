// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;

use crate::errors::WorkflowError;
use crate::workflow::runtime::StageRuntime;
use crate::workflow::WorkflowContext;

/// Identity of a pipeline stage. The label doubles as the context's `current_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    ImageCollector,
    PromptEnhancer,
    Router,
    CodeGenerator,
    CodeQualityCheck,
    ProjectBuilder,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::ImageCollector => "image_collector",
            StageName::PromptEnhancer => "prompt_enhancer",
            StageName::Router => "router",
            StageName::CodeGenerator => "code_generator",
            StageName::CodeQualityCheck => "code_quality_check",
            StageName::ProjectBuilder => "project_builder",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    /// Read what earlier stages produced and populate this stage's fields.
    ///
    /// Any error ends the execution; the engine does not retry.
    async fn run(&self, ctx: &mut WorkflowContext, rt: &StageRuntime) -> Result<(), WorkflowError>;

    fn name(&self) -> StageName;
}
