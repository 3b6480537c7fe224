// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Generates code and persists it through the saver registry.
//!
//! HTML and multi-file answers are streamed as `token` events and parsed from
//! fenced blocks. Project types run a tool loop: the model writes files into
//! the session's staging sandbox through `file_operation` calls until it
//! answers without tool calls, and the sandbox is then snapshotted into a
//! project result.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::errors::WorkflowError;
use crate::model::prompt::{generation_system_prompt, GENERATION_USER};
use crate::model::{Message, ModelRequest, Purpose, ToolSpec};
use crate::observability::messages::{tools::ToolRound, StructuredLog};
use crate::saver::GenerationResult;
use crate::stages::{code_parser, failure};
use crate::tools::ToolExecutor;
use crate::traits::{Stage, StageName};
use crate::utils::fs::snapshot_text_files;
use crate::workflow::runtime::StageRuntime;
use crate::workflow::{GenerationType, WorkflowContext};

/// Staging directories left out of the project snapshot, besides the usual skips.
const SNAPSHOT_EXCLUDES: &[&str] = &["dist"];

/// Whether a project generation starts from an empty sandbox or keeps earlier files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sandbox {
    Fresh,
    Reuse,
}

/// Generate code for `ctx`'s type with `user_prompt` and save it. Returns the code directory.
pub async fn generate_code(
    ctx: &WorkflowContext,
    rt: &StageRuntime,
    user_prompt: String,
    sandbox: Sandbox,
) -> Result<PathBuf, WorkflowError> {
    let kind = ctx
        .generation_type()
        .ok_or_else(|| WorkflowError::Context("generation type is not set".to_string()))?;
    let system = generation_system_prompt(kind)?;

    let result = if kind.is_project() {
        run_tool_loop(ctx, rt, kind, system, user_prompt, sandbox).await?
    } else {
        let request = ModelRequest::new(
            Purpose::CodeGeneration,
            vec![Message::system(system), Message::user(user_prompt)],
        )
        .streaming();
        let turn = rt.call_model(request).await?;
        match kind {
            GenerationType::MultiFile => GenerationResult::MultiFile {
                files: code_parser::parse_multi_file(&turn.content),
            },
            _ => GenerationResult::Html {
                html: code_parser::parse_html(&turn.content),
            },
        }
    };

    rt.ensure_active()?;
    let dir = rt.layout().code_dir(kind, ctx.session_id());
    Ok(rt.savers().save(kind, Some(result), &dir).await?)
}

async fn run_tool_loop(
    ctx: &WorkflowContext,
    rt: &StageRuntime,
    kind: GenerationType,
    system: String,
    user_prompt: String,
    sandbox: Sandbox,
) -> Result<GenerationResult, WorkflowError> {
    let staging = rt.layout().staging_dir(kind, ctx.session_id());
    if sandbox == Sandbox::Fresh && staging.exists() {
        tokio::fs::remove_dir_all(&staging)
            .await
            .map_err(|e| failure(StageName::CodeGenerator, e))?;
    }
    let executor =
        ToolExecutor::new(&staging).map_err(|e| failure(StageName::CodeGenerator, e))?;

    let max_rounds = rt.settings().generation.max_tool_rounds;
    let mut messages = vec![Message::system(system), Message::user(user_prompt)];

    for round in 1..=max_rounds {
        let request = ModelRequest::new(Purpose::CodeGeneration, messages.clone())
            .with_tools(vec![ToolSpec::file_operation()])
            .streaming();
        let turn = rt.call_model(request).await?;

        if turn.tool_calls.is_empty() {
            let files = snapshot_text_files(executor.root(), SNAPSHOT_EXCLUDES)
                .map_err(|e| failure(StageName::CodeGenerator, e))?;
            return Ok(GenerationResult::Project { files });
        }

        ToolRound {
            session_id: ctx.session_id().as_str(),
            round,
            calls: turn.tool_calls.len(),
        }
        .log();

        messages.push(Message::assistant(&turn));
        for call in &turn.tool_calls {
            rt.ensure_active()?;
            let report = executor.dispatch(call).await;
            messages.push(Message::tool(report.call_id, report.for_model));
            rt.sink().tool_audit(report.audit);
        }
    }

    Err(failure(
        StageName::CodeGenerator,
        format!("model did not finish within {} tool rounds", max_rounds),
    ))
}

pub struct CodeGeneratorStage;

#[async_trait]
impl Stage for CodeGeneratorStage {
    async fn run(&self, ctx: &mut WorkflowContext, rt: &StageRuntime) -> Result<(), WorkflowError> {
        let prompt = ctx
            .enhanced_prompt()
            .unwrap_or(ctx.original_prompt())
            .to_string();
        let user = GENERATION_USER.render(&[("prompt", &prompt)])?;

        let dir = generate_code(ctx, rt, user, Sandbox::Fresh).await?;
        ctx.set_generated_code_dir(dir)
    }

    fn name(&self) -> StageName {
        StageName::CodeGenerator
    }
}
