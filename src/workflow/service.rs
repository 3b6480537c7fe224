// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Entry point for one generation request.
//!
//! A request passes the guardrail, claims its session, runs the engine and
//! closes its event stream with exactly one terminal sequence. Rejections
//! before the engine starts (invalid session, refused prompt, busy session)
//! close the stream the same way, without any model call.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::WorkflowError;
use crate::guardrail::Guardrail;
use crate::observability::messages::{
    engine::WorkflowFailed, guardrail::PromptRejected, StructuredLog,
};
use crate::saver::{OutputLayout, SaverRegistry};
use crate::traits::ModelService;
use crate::workflow::engine::WorkflowEngine;
use crate::workflow::events::{EventSink, StreamEvent};
use crate::workflow::runtime::{PipelineSettings, StageRuntime};
use crate::workflow::session::SessionRegistry;
use crate::workflow::{SessionId, WorkflowContext};

/// How a request ended.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// Refused before any stage ran.
    Rejected(WorkflowError),
    Completed(WorkflowContext),
    Failed {
        context: WorkflowContext,
        error: WorkflowError,
    },
}

impl GenerationOutcome {
    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            GenerationOutcome::Rejected(error) => Some(error),
            GenerationOutcome::Failed { error, .. } => Some(error),
            GenerationOutcome::Completed(_) => None,
        }
    }

    pub fn context(&self) -> Option<&WorkflowContext> {
        match self {
            GenerationOutcome::Completed(context) => Some(context),
            GenerationOutcome::Failed { context, .. } => Some(context),
            GenerationOutcome::Rejected(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Completed(_))
    }
}

pub struct WorkflowService {
    engine: WorkflowEngine,
    guardrail: Guardrail,
    sessions: Arc<SessionRegistry>,
    model: Arc<dyn ModelService>,
    savers: Arc<SaverRegistry>,
    layout: OutputLayout,
    settings: Arc<PipelineSettings>,
}

impl WorkflowService {
    pub fn new(
        model: Arc<dyn ModelService>,
        savers: Arc<SaverRegistry>,
        layout: OutputLayout,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            engine: WorkflowEngine::standard(&settings),
            guardrail: Guardrail::new(),
            sessions: SessionRegistry::new(),
            model,
            savers,
            layout,
            settings: Arc::new(settings),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Run one request to completion, streaming its events into `tx`.
    pub async fn run(
        &self,
        session: &str,
        prompt: &str,
        tx: mpsc::UnboundedSender<StreamEvent>,
    ) -> GenerationOutcome {
        let early = EventSink::new(tx.clone(), CancellationToken::new());

        let session = match SessionId::parse(session) {
            Ok(session) => session,
            Err(error) => return reject(&early, session, error),
        };

        if let Err(reason) = self.guardrail.check(prompt) {
            PromptRejected {
                session_id: session.as_str(),
                rule: reason.rule(),
                input_len: prompt.chars().count(),
            }
            .log();
            return reject(&early, session.as_str(), reason.into());
        }

        let lease = match self.sessions.acquire(&session) {
            Ok(lease) => lease,
            Err(error) => return reject(&early, session.as_str(), error),
        };

        let sink = EventSink::new(tx, lease.cancellation())
            .with_mirror(self.sessions.mirror_for(&session));
        let rt = StageRuntime::new(
            Arc::clone(&self.model),
            Arc::clone(&self.savers),
            self.layout.clone(),
            Arc::clone(&self.settings),
            sink.clone(),
        );
        let mut ctx = WorkflowContext::new(session.clone(), prompt);

        let result = self.engine.execute(&mut ctx, &rt).await;

        // Release before the terminal events so a caller reacting to `done` can resubmit.
        drop(lease);

        match result {
            Ok(()) => {
                sink.finish(None);
                GenerationOutcome::Completed(ctx)
            }
            Err(error) => {
                WorkflowFailed {
                    session_id: session.as_str(),
                    code: error.code().as_i32(),
                    error: &error,
                }
                .log();
                sink.finish(Some(&error));
                GenerationOutcome::Failed {
                    context: ctx,
                    error,
                }
            }
        }
    }

    /// Start a request in the background and hand back its event stream.
    pub fn generate(
        self: &Arc<Self>,
        session: impl Into<String>,
        prompt: impl Into<String>,
    ) -> (
        mpsc::UnboundedReceiver<StreamEvent>,
        JoinHandle<GenerationOutcome>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Arc::clone(self);
        let session = session.into();
        let prompt = prompt.into();
        let handle = tokio::spawn(async move { service.run(&session, &prompt, tx).await });
        (rx, handle)
    }

    /// Ask the in-flight request for `session` to stop. Returns whether one was running.
    pub fn stop(&self, session: &str) -> bool {
        match SessionId::parse(session) {
            Ok(session) => self.sessions.stop(&session),
            Err(_) => false,
        }
    }

    /// Mirror of the events of every later request for `session`.
    pub fn subscribe(
        &self,
        session: &str,
    ) -> Result<broadcast::Receiver<StreamEvent>, WorkflowError> {
        let session = SessionId::parse(session)?;
        Ok(self.sessions.subscribe(&session))
    }
}

fn reject(sink: &EventSink, session: &str, error: WorkflowError) -> GenerationOutcome {
    WorkflowFailed {
        session_id: session,
        code: error.code().as_i32(),
        error: &error,
    }
    .log();
    sink.finish(Some(&error));
    GenerationOutcome::Rejected(error)
}
