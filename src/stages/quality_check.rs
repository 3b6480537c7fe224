// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Optional review of generated code with bounded regeneration.
//!
//! The generated files are sent to the model for review. An invalid report
//! re-runs code generation with the reported problems appended, up to
//! `max_retries` times; after that the pipeline proceeds with a warning. A
//! review answer that cannot be parsed counts as valid.

use async_trait::async_trait;
use std::path::Path;

use crate::errors::WorkflowError;
use crate::model::prompt::{GENERATION_RETRY_USER, QUALITY_SYSTEM, QUALITY_USER};
use crate::model::{parse_structured, Message, ModelRequest, Purpose};
use crate::observability::messages::{
    engine::{QualityRetriesExhausted, QualityRetry},
    stages::DegradedAnswer,
    StructuredLog,
};
use crate::stages::code_generator::{generate_code, Sandbox};
use crate::stages::failure;
use crate::tools::audit::fence_tag;
use crate::traits::{Stage, StageName};
use crate::utils::fs::snapshot_text_files;
use crate::workflow::runtime::StageRuntime;
use crate::workflow::{GenerationType, QualityReport, WorkflowContext};

fn render_files(code_dir: &Path) -> Result<String, WorkflowError> {
    let files = snapshot_text_files(code_dir, &[])
        .map_err(|e| failure(StageName::CodeQualityCheck, e))?;
    Ok(files
        .iter()
        .map(|(path, content)| format!("### {}\n```{}\n{}\n```", path, fence_tag(path), content))
        .collect::<Vec<_>>()
        .join("\n\n"))
}

pub struct CodeQualityCheckStage;

impl CodeQualityCheckStage {
    async fn review(
        &self,
        kind: GenerationType,
        code_dir: &Path,
        rt: &StageRuntime,
    ) -> Result<QualityReport, WorkflowError> {
        let system = QUALITY_SYSTEM.render(&[])?;
        let files = render_files(code_dir)?;
        let user = QUALITY_USER.render(&[("generation_type", kind.as_str()), ("files", &files)])?;
        let request = ModelRequest::new(
            Purpose::QualityCheck,
            vec![Message::system(system), Message::user(user)],
        )
        .json();

        let turn = rt.call_model(request).await?;
        Ok(parse_structured::<QualityReport>(&turn.content).unwrap_or_else(|error| {
            DegradedAnswer {
                stage: self.name().as_str(),
                fallback: "a passing report",
                error: &error,
            }
            .log();
            QualityReport {
                is_valid: true,
                errors: Vec::new(),
                suggestions: Vec::new(),
            }
        }))
    }
}

#[async_trait]
impl Stage for CodeQualityCheckStage {
    async fn run(&self, ctx: &mut WorkflowContext, rt: &StageRuntime) -> Result<(), WorkflowError> {
        let kind = ctx
            .generation_type()
            .ok_or_else(|| WorkflowError::Context("generation type is not set".to_string()))?;
        let max_retries = rt.settings().quality_check.max_retries;
        let mut attempt = 0;

        loop {
            let code_dir = ctx
                .generated_code_dir()
                .ok_or_else(|| WorkflowError::Context("generated code dir is not set".to_string()))?
                .to_path_buf();
            let report = self.review(kind, &code_dir, rt).await?;
            let valid = report.is_valid;
            let problems = report.errors.clone();
            ctx.record_quality_report(report);

            if valid {
                return Ok(());
            }
            if attempt >= max_retries {
                QualityRetriesExhausted {
                    session_id: ctx.session_id().as_str(),
                    max_retries,
                    error_count: problems.len(),
                }
                .log();
                return Ok(());
            }

            attempt += 1;
            QualityRetry {
                session_id: ctx.session_id().as_str(),
                attempt,
                max_retries,
                error_count: problems.len(),
            }
            .log();

            let prompt = ctx
                .enhanced_prompt()
                .unwrap_or(ctx.original_prompt())
                .to_string();
            let bullet_list = problems
                .iter()
                .map(|problem| format!("- {}", problem))
                .collect::<Vec<_>>()
                .join("\n");
            let user = GENERATION_RETRY_USER.render(&[("prompt", &prompt), ("errors", &bullet_list)])?;
            let dir = generate_code(ctx, rt, user, Sandbox::Reuse).await?;
            ctx.replace_generated_code_dir(dir, &format!("quality check retry {}", attempt));
        }
    }

    fn name(&self) -> StageName {
        StageName::CodeQualityCheck
    }
}
