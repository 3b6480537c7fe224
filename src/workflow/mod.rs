// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow orchestration: the shared context, the stage engine, streaming
//! events, session exclusivity and the request-level service.

pub mod context;
pub mod engine;
pub mod events;
pub mod runtime;
pub mod service;
pub mod session;

#[cfg(test)]
mod integration_tests;

pub use context::{
    GenerationType, ImageCategory, ImageResource, QualityReport, SessionId, WorkflowContext,
};
pub use engine::WorkflowEngine;
pub use events::{EventSink, StepSnapshot, StreamEvent};
pub use runtime::{PipelineSettings, StageRuntime};
pub use service::{GenerationOutcome, WorkflowService};
pub use session::{SessionLease, SessionRegistry};
