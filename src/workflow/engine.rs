// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequential stage execution over one context.
//!
//! Stages run strictly in order. After each successful stage the engine marks
//! the step and emits a `step` snapshot. The first failing stage ends the
//! execution: its error is recorded in the context and returned, and no later
//! stage runs. The engine never retries a stage.

use std::time::Instant;
use tracing::Instrument;

use crate::errors::WorkflowError;
use crate::observability::messages::{
    engine::{
        StageCompleted, StageFailed, StageStarted, WorkflowCancelled, WorkflowCompleted,
        WorkflowStarted,
    },
    StructuredLog,
};
use crate::stages::{
    CodeGeneratorStage, CodeQualityCheckStage, ImageCollectorStage, ProjectBuilderStage,
    PromptEnhancerStage, RouterStage,
};
use crate::traits::{Stage, StageName};
use crate::workflow::events::StepSnapshot;
use crate::workflow::runtime::{PipelineSettings, StageRuntime};
use crate::workflow::WorkflowContext;

/// Error message recorded in the context when a stop signal ends the execution.
pub const CANCELLED_MESSAGE: &str = "generation cancelled";

pub struct WorkflowEngine {
    stages: Vec<Box<dyn Stage>>,
}

impl WorkflowEngine {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The built-in pipeline; the quality check is included only when enabled.
    pub fn standard(settings: &PipelineSettings) -> Self {
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(ImageCollectorStage),
            Box::new(PromptEnhancerStage),
            Box::new(RouterStage),
            Box::new(CodeGeneratorStage),
        ];
        if settings.quality_check.enabled {
            stages.push(Box::new(CodeQualityCheckStage));
        }
        stages.push(Box::new(ProjectBuilderStage));
        Self::new(stages)
    }

    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub async fn execute(
        &self,
        ctx: &mut WorkflowContext,
        rt: &StageRuntime,
    ) -> Result<(), WorkflowError> {
        let session_id = ctx.session_id().to_string();
        let started = WorkflowStarted {
            session_id: &session_id,
            prompt_len: ctx.original_prompt().chars().count(),
            stage_count: self.stages.len(),
        };
        let span = started.span("workflow_execution");
        started.log();

        self.run_stages(&session_id, ctx, rt).instrument(span).await
    }

    async fn run_stages(
        &self,
        session_id: &str,
        ctx: &mut WorkflowContext,
        rt: &StageRuntime,
    ) -> Result<(), WorkflowError> {
        let workflow_start = Instant::now();

        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.name();
            let step_number = index + 1;

            let outcome = match rt.ensure_active() {
                Ok(()) => {
                    StageStarted {
                        session_id,
                        stage: name.as_str(),
                        step_number,
                    }
                    .log();
                    let stage_start = Instant::now();
                    let outcome = stage.run(ctx, rt).await;
                    if outcome.is_ok() {
                        StageCompleted {
                            session_id,
                            stage: name.as_str(),
                            duration: stage_start.elapsed(),
                        }
                        .log();
                    }
                    outcome
                }
                Err(cancelled) => Err(cancelled),
            };

            match outcome {
                Ok(()) => {
                    ctx.mark_step(name);
                    rt.sink().step(StepSnapshot::capture(step_number, ctx));
                }
                Err(WorkflowError::Cancelled) => {
                    WorkflowCancelled {
                        session_id,
                        stage: name.as_str(),
                    }
                    .log();
                    ctx.mark_failed(name, CANCELLED_MESSAGE.to_string(), true);
                    return Err(WorkflowError::Cancelled);
                }
                Err(error) => {
                    StageFailed {
                        session_id,
                        stage: name.as_str(),
                        error: &error,
                    }
                    .log();
                    ctx.mark_failed(name, error.to_string(), false);
                    return Err(error);
                }
            }
        }

        WorkflowCompleted {
            session_id,
            generation_type: ctx.generation_type().map(|t| t.as_str()).unwrap_or("unknown"),
            build_result_dir: &ctx
                .build_result_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            duration: workflow_start.elapsed(),
        }
        .log();
        Ok(())
    }
}
