// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Model-issued file operations against a per-session sandbox.

pub mod audit;
pub mod executor;
pub mod invocation;

pub use executor::{ToolExecutor, ToolOutput, ToolReport};
pub use invocation::{ToolInvocation, ToolName};
