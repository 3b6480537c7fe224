// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for persisting generation results.

use crate::utils::path_guard::PathViolation;
use crate::workflow::GenerationType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaverError {
    /// The generation result is missing, of the wrong shape, or has blank required fields.
    #[error("Content validation failed: {0}")]
    ContentValidation(String),

    /// A member path of a multi-file result escapes the output directory.
    #[error(transparent)]
    PathViolation(#[from] PathViolation),

    /// No strategy handles this generation type. This is a wiring bug, not user error.
    #[error("No saver registered for generation type '{0}'")]
    UnmappedType(GenerationType),

    /// More than one strategy claims the same generation type.
    #[error("Generation type '{0}' is claimed by more than one saver")]
    DuplicateStrategy(GenerationType),

    #[error("I/O error while saving: {0}")]
    Io(#[from] std::io::Error),
}
