// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Streaming events and the sink that carries them to the caller.
//!
//! The sink is passed explicitly into every stage and tool call. It forwards
//! each event to the caller's channel and, when someone is observing the
//! session, mirrors it onto a broadcast channel. Once the session's
//! cancellation token fires, `token` events are dropped. Terminal events
//! (`business-error` then `done`) are emitted at most once per sink.

use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::errors::WorkflowError;
use crate::workflow::context::{GenerationType, WorkflowContext};

/// Observable state after a stage completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    pub step_number: usize,
    pub current_step: String,
    pub image_count: Option<usize>,
    pub enhanced_prompt_len: Option<usize>,
    pub generation_type: Option<GenerationType>,
    pub generated_code_dir: Option<PathBuf>,
    pub build_result_dir: Option<PathBuf>,
    pub error_message: Option<String>,
}

impl StepSnapshot {
    pub fn capture(step_number: usize, ctx: &WorkflowContext) -> Self {
        Self {
            step_number,
            current_step: ctx.current_step().to_string(),
            image_count: ctx.image_list().map(<[_]>::len),
            enhanced_prompt_len: ctx.enhanced_prompt().map(str::len),
            generation_type: ctx.generation_type(),
            generated_code_dir: ctx.generated_code_dir().map(PathBuf::from),
            build_result_dir: ctx.build_result_dir().map(PathBuf::from),
            error_message: ctx.error_message().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental model output.
    Token(String),
    /// Human-readable audit line for one tool invocation.
    Tool(String),
    /// Context snapshot after a stage.
    Step(StepSnapshot),
    BusinessError { code: i32, message: String },
    /// Stream-closing event, on success and on failure.
    Done,
}

impl StreamEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Token(_) => "token",
            StreamEvent::Tool(_) => "tool",
            StreamEvent::Step(_) => "step",
            StreamEvent::BusinessError { .. } => "business-error",
            StreamEvent::Done => "done",
        }
    }

    /// JSON payload of the event; `done` carries an empty payload.
    pub fn data(&self) -> String {
        match self {
            StreamEvent::Token(d) => json!({ "d": d }).to_string(),
            StreamEvent::Tool(d) => json!({ "d": d }).to_string(),
            StreamEvent::Step(snapshot) => {
                serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string())
            }
            StreamEvent::BusinessError { code, message } => {
                json!({ "error": true, "code": code, "message": message }).to_string()
            }
            StreamEvent::Done => String::new(),
        }
    }

    /// Server-sent-events framing.
    pub fn to_sse(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.name(), self.data())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}

#[derive(Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<StreamEvent>>,
    mirror: Option<broadcast::Sender<StreamEvent>>,
    cancel: CancellationToken,
    terminated: Arc<AtomicBool>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>, cancel: CancellationToken) -> Self {
        Self {
            tx: Some(tx),
            mirror: None,
            cancel,
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A sink with no consumer.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self {
            tx: None,
            mirror: None,
            cancel: CancellationToken::new(),
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_mirror(mut self, mirror: Option<broadcast::Sender<StreamEvent>>) -> Self {
        self.mirror = mirror;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn emit(&self, event: StreamEvent) {
        if let Some(mirror) = &self.mirror {
            // No live observers is not an error.
            let _ = mirror.send(event.clone());
        }
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::debug!("Event receiver dropped; discarding event");
            }
        }
    }

    pub fn token(&self, text: impl Into<String>) {
        if self.cancel.is_cancelled() || self.terminated.load(Ordering::SeqCst) {
            return;
        }
        self.emit(StreamEvent::Token(text.into()));
    }

    pub fn tool_audit(&self, message: impl Into<String>) {
        if self.terminated.load(Ordering::SeqCst) {
            return;
        }
        self.emit(StreamEvent::Tool(message.into()));
    }

    pub fn step(&self, snapshot: StepSnapshot) {
        if self.terminated.load(Ordering::SeqCst) {
            return;
        }
        self.emit(StreamEvent::Step(snapshot));
    }

    /// Emit the terminal sequence exactly once: an optional `business-error`, then `done`.
    ///
    /// Returns `false` if the sink was already terminated.
    pub fn finish(&self, error: Option<&WorkflowError>) -> bool {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Some(error) = error {
            self.emit(StreamEvent::BusinessError {
                code: error.code().as_i32(),
                message: error.to_string(),
            });
        }
        self.emit(StreamEvent::Done);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_sse_framing() {
        let error = StreamEvent::BusinessError {
            code: 40000,
            message: "Input rejected".into(),
        };
        let frame = error.to_sse();
        assert!(frame.starts_with("event: business-error\ndata: "));
        let payload: serde_json::Value =
            serde_json::from_str(frame.lines().nth(1).unwrap().trim_start_matches("data: ")).unwrap();
        assert_eq!(payload["error"], true);
        assert_eq!(payload["code"], 40000);

        assert_eq!(StreamEvent::Done.to_sse(), "event: done\ndata: \n\n");
    }

    #[test]
    fn test_finish_emits_terminal_sequence_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(tx, CancellationToken::new());

        let err = WorkflowError::Cancelled;
        assert!(sink.finish(Some(&err)));
        assert!(!sink.finish(None));
        sink.token("late");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "business-error");
        assert_eq!(events[1], StreamEvent::Done);
    }

    #[test]
    fn test_tokens_dropped_after_cancellation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let sink = EventSink::new(tx, cancel.clone());

        sink.token("a");
        cancel.cancel();
        sink.token("b");
        sink.finish(Some(&WorkflowError::Cancelled));

        let names: Vec<&str> = drain(&mut rx).iter().map(StreamEvent::name).collect();
        assert_eq!(names, vec!["token", "business-error", "done"]);
    }

    #[test]
    fn test_detached_sink_follows_supplied_token() {
        let cancel = CancellationToken::new();
        let sink = EventSink::detached().with_cancellation(cancel.clone());

        assert!(!sink.cancellation().is_cancelled());
        cancel.cancel();
        assert!(sink.cancellation().is_cancelled());
        sink.token("dropped");
        assert!(sink.finish(None));
        assert!(!sink.finish(None));
    }

    #[test]
    fn test_mirror_receives_same_sequence() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (mirror, mut observer) = broadcast::channel(16);
        let sink = EventSink::new(tx, CancellationToken::new()).with_mirror(Some(mirror));

        sink.token("<html>");
        sink.finish(None);

        let primary = drain(&mut rx);
        let mut mirrored = Vec::new();
        while let Ok(event) = observer.try_recv() {
            mirrored.push(event);
        }
        assert_eq!(primary, mirrored);
    }
}
