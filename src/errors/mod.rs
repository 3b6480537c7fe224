// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod model;
mod saver;
mod tools;
mod workflow;

pub use config::ConfigError;
pub use model::ModelError;
pub use saver::SaverError;
pub use tools::ToolExecutionError;
pub use workflow::{ErrorCode, WorkflowError};
