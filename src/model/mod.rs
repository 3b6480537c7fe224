// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Model service plumbing.
//!
//! The model is consumed as an opaque service through [`crate::traits::ModelService`].
//! This module holds the request/turn types, prompt templates, the structured
//! answer parser and the HTTP backend.

pub mod openai;
pub mod prompt;
pub mod structured;
pub mod types;

#[cfg(test)]
pub mod stub;

pub use openai::{HttpParams, OpenAiCompatibleModel};
pub use prompt::PromptTemplate;
pub use structured::parse_structured;
pub use types::{
    Message, ModelRequest, ModelTurn, Purpose, ResponseFormat, Role, ToolCall, ToolSpec,
};
