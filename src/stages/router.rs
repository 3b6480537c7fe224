// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Classifies the request into one [`GenerationType`].
//!
//! The model is asked for a bare value; a JSON object carrying
//! `generation_type` (or `type`) is accepted too. Case, surrounding quotes,
//! backticks and a trailing period are ignored. Anything else is unknown and
//! handled by the configured [`UnknownTypePolicy`]; it is never coerced silently.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::UnknownTypePolicy;
use crate::errors::WorkflowError;
use crate::model::prompt::{ROUTING_SYSTEM, ROUTING_USER};
use crate::model::structured::extract_json;
use crate::model::{Message, ModelRequest, Purpose};
use crate::observability::messages::{stages::RoutingFallback, StructuredLog};
use crate::traits::{Stage, StageName};
use crate::workflow::runtime::StageRuntime;
use crate::workflow::{GenerationType, WorkflowContext};

#[derive(Deserialize)]
struct RoutingAnswer {
    #[serde(alias = "type", alias = "generationType")]
    generation_type: String,
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'' || c == '.')
        .trim()
        .to_ascii_lowercase()
        .replace('-', "_")
}

/// Parse a routing answer into a generation type; `Err` carries the cleaned raw value.
pub fn classify_answer(raw: &str) -> Result<GenerationType, String> {
    let candidate = extract_json(raw)
        .and_then(|json| serde_json::from_str::<RoutingAnswer>(json).ok())
        .map(|answer| answer.generation_type)
        .unwrap_or_else(|| raw.to_string());

    let value = normalize(&candidate);
    value.parse::<GenerationType>()
}

pub struct RouterStage;

impl RouterStage {
    fn resolve(&self, raw: &str, rt: &StageRuntime) -> Result<GenerationType, WorkflowError> {
        match classify_answer(raw) {
            Ok(kind) => Ok(kind),
            Err(value) => match rt.settings().routing.on_unknown {
                UnknownTypePolicy::Fail => Err(WorkflowError::Classification { raw: value }),
                UnknownTypePolicy::Fallback => {
                    let fallback = rt.settings().routing.fallback_type;
                    RoutingFallback {
                        raw: &value,
                        fallback: fallback.as_str(),
                    }
                    .log();
                    Ok(fallback)
                }
            },
        }
    }
}

#[async_trait]
impl Stage for RouterStage {
    async fn run(&self, ctx: &mut WorkflowContext, rt: &StageRuntime) -> Result<(), WorkflowError> {
        let system = ROUTING_SYSTEM.render(&[])?;
        let user = ROUTING_USER.render(&[("prompt", ctx.original_prompt())])?;
        let request = ModelRequest::new(
            Purpose::Routing,
            vec![Message::system(system), Message::user(user)],
        );

        let turn = rt.call_model(request).await?;
        let kind = self.resolve(&turn.content, rt)?;
        tracing::info!(
            session_id = %ctx.session_id(),
            generation_type = kind.as_str(),
            "Request routed"
        );
        ctx.set_generation_type(kind)
    }

    fn name(&self) -> StageName {
        StageName::Router
    }
}
