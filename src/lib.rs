// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // config loading + runtime wiring
pub mod errors;     // error handling
pub mod guardrail;  // prompt screening
pub mod model;      // model service backends and prompts
pub mod observability;
pub mod saver;      // per-type artifact persistence
pub mod stages;     // pipeline stages
pub mod tools;      // sandboxed file tools
pub mod traits;     // unified abstractions
pub mod utils;
pub mod workflow;   // context, engine, sessions, events
