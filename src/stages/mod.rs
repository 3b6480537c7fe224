// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline stages.
//!
//! Stages run strictly in order over one [`WorkflowContext`](crate::workflow::WorkflowContext):
//!
//! | stage                | reads                          | writes               |
//! |----------------------|--------------------------------|----------------------|
//! | `image_collector`    | original prompt                | image list           |
//! | `prompt_enhancer`    | original prompt, image list    | enhanced prompt      |
//! | `router`             | original prompt                | generation type      |
//! | `code_generator`     | enhanced prompt, type          | generated code dir   |
//! | `code_quality_check` | generated code dir             | quality report       |
//! | `project_builder`    | type, generated code dir       | build result dir     |
//!
//! `code_quality_check` is only part of the pipeline when enabled in configuration.

pub mod code_generator;
pub mod code_parser;
pub mod image_collector;
pub mod project_builder;
pub mod prompt_enhancer;
pub mod quality_check;
pub mod router;

pub use code_generator::CodeGeneratorStage;
pub use image_collector::ImageCollectorStage;
pub use project_builder::ProjectBuilderStage;
pub use prompt_enhancer::PromptEnhancerStage;
pub use quality_check::CodeQualityCheckStage;
pub use router::RouterStage;

use crate::errors::WorkflowError;
use crate::traits::StageName;

/// Wrap a non-domain failure raised inside `stage`.
pub(crate) fn failure(stage: StageName, error: impl std::fmt::Display) -> WorkflowError {
    WorkflowError::stage_failure(stage.as_str(), error.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::model::stub::ScriptedModel;
    use crate::saver::{OutputLayout, SaverRegistry};
    use crate::workflow::runtime::{PipelineSettings, StageRuntime};
    use crate::workflow::{EventSink, SessionId, StreamEvent, WorkflowContext};

    pub fn runtime(
        model: Arc<ScriptedModel>,
        root: &Path,
        settings: PipelineSettings,
    ) -> (StageRuntime, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let rt = StageRuntime::new(
            model,
            Arc::new(SaverRegistry::standard().unwrap()),
            OutputLayout::new(root),
            Arc::new(settings),
            EventSink::new(tx, CancellationToken::new()),
        );
        (rt, rx)
    }

    pub fn context(prompt: &str) -> WorkflowContext {
        WorkflowContext::new(SessionId::parse("s-1").unwrap(), prompt)
    }

    pub fn drain(rx: &mut mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }
}
