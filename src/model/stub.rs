// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::ModelError;
use crate::model::types::{ModelRequest, ModelTurn, Purpose, ToolCall};
use crate::traits::ModelService;
use crate::workflow::EventSink;

const TOKEN_CHUNK_CHARS: usize = 16;

enum Reply {
    Turn(ModelTurn),
    Fail(String),
    /// Never answers; only cancellation or a timeout ends the call.
    Hang,
}

/// A model that replays queued replies per purpose, for testing.
///
/// Streamed replies are pushed to the sink in fixed-size chunks. Every request
/// is recorded so tests can assert on what the pipeline sent.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<HashMap<Purpose, VecDeque<Reply>>>,
    requests: Mutex<Vec<ModelRequest>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, purpose: Purpose, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(purpose)
            .or_default()
            .push_back(reply);
        self
    }

    pub fn text(self, purpose: Purpose, content: &str) -> Self {
        self.push(purpose, Reply::Turn(ModelTurn::text(content)))
    }

    /// Queue an answer requesting `file_operation` calls with the given JSON arguments.
    pub fn tool_calls(self, purpose: Purpose, arguments: &[&str]) -> Self {
        let calls = arguments
            .iter()
            .enumerate()
            .map(|(i, args)| ToolCall {
                id: format!("call_{}", i),
                name: crate::model::ToolSpec::FILE_OPERATION.to_string(),
                arguments: args.to_string(),
            })
            .collect();
        self.push(purpose, Reply::Turn(ModelTurn::default().with_tool_calls(calls)))
    }

    pub fn fail(self, purpose: Purpose, message: &str) -> Self {
        self.push(purpose, Reply::Fail(message.to_string()))
    }

    pub fn hang(self, purpose: Purpose) -> Self {
        self.push(purpose, Reply::Hang)
    }

    /// Delay every reply, to keep a session busy in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, purpose: Purpose) -> Vec<ModelRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.purpose == purpose)
            .collect()
    }
}

#[async_trait]
impl ModelService for ScriptedModel {
    async fn chat(&self, request: ModelRequest, sink: &EventSink) -> Result<ModelTurn, ModelError> {
        let purpose = request.purpose;
        let stream = request.stream;
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&purpose)
            .and_then(VecDeque::pop_front);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(Reply::Turn(turn)) => {
                if stream {
                    let chars: Vec<char> = turn.content.chars().collect();
                    for chunk in chars.chunks(TOKEN_CHUNK_CHARS) {
                        sink.token(chunk.iter().collect::<String>());
                    }
                }
                Ok(turn)
            }
            Some(Reply::Fail(message)) => Err(ModelError::Transport(message)),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(ModelError::InvalidResponse(format!(
                "no scripted reply for {}",
                purpose.as_str()
            ))),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
