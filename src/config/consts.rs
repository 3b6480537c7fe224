// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default root for generated code, staging sandboxes and build results
pub const DEFAULT_OUTPUT_ROOT: &str = "./output";
/// Default model identifier sent to the model service
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Environment variable holding the model API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Bounded wait for one model round-trip, in seconds
pub const DEFAULT_MODEL_TIMEOUT_SECONDS: u64 = 120;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Upper bound on images suggested by the image collector
pub const DEFAULT_MAX_IMAGES: usize = 8;
/// Upper bound on model turns in the project tool loop
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 20;
/// Regeneration passes after a failed quality check
pub const DEFAULT_QUALITY_MAX_RETRIES: u32 = 1;
/// Directory inside a project that holds the build output
pub const DEFAULT_BUILD_OUTPUT_SUBDIR: &str = "dist";
/// Bound on each build command, in seconds
pub const DEFAULT_BUILD_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_INSTALL_COMMAND: &[&str] = &["npm", "install"];
pub const DEFAULT_BUILD_COMMAND: &[&str] = &["npm", "run", "build"];
