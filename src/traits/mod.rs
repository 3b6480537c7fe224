// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod model;
pub mod saver;
pub mod stage;

pub use model::ModelService;
pub use saver::CodeSaver;
pub use stage::{Stage, StageName};
