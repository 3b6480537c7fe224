// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Savers for results made of several files.
//!
//! Every member path is confined to the output directory before the first
//! file is written, so one bad path leaves the directory untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::SaverError;
use crate::saver::html::INDEX_FILE;
use crate::saver::GenerationResult;
use crate::traits::CodeSaver;
use crate::utils::path_guard::{normalize_relative, resolve_within};
use crate::workflow::GenerationType;

/// Write `files` beneath `base_dir`, creating subdirectories as needed.
pub(crate) fn write_members(
    files: &BTreeMap<String, String>,
    base_dir: &Path,
) -> Result<(), SaverError> {
    let root = base_dir.canonicalize()?;
    let mut targets: Vec<(PathBuf, &String)> = Vec::with_capacity(files.len());
    for (path, content) in files {
        targets.push((resolve_within(&root, path)?, content));
    }

    for (target, content) in targets {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(target, content)?;
    }
    Ok(())
}

/// Lexical confinement of every member path, plus the required file.
pub(crate) fn validate_members(
    files: &BTreeMap<String, String>,
    required: &str,
) -> Result<(), SaverError> {
    for path in files.keys() {
        normalize_relative(path)?;
    }
    match files.get(required) {
        Some(content) if !content.trim().is_empty() => Ok(()),
        Some(_) => Err(SaverError::ContentValidation(format!(
            "required file '{}' is blank",
            required
        ))),
        None => Err(SaverError::ContentValidation(format!(
            "required file '{}' is missing",
            required
        ))),
    }
}

/// Static site: HTML, CSS and JavaScript files.
pub struct MultiFileSaver;

impl CodeSaver for MultiFileSaver {
    fn validate_input(&self, result: &GenerationResult) -> Result<(), SaverError> {
        match result {
            GenerationResult::MultiFile { files } => validate_members(files, INDEX_FILE),
            other => Err(SaverError::ContentValidation(format!(
                "multi-file saver cannot persist a {} result",
                other.shape()
            ))),
        }
    }

    fn save_files(&self, result: &GenerationResult, base_dir: &Path) -> Result<(), SaverError> {
        match result {
            GenerationResult::MultiFile { files } => write_members(files, base_dir),
            other => Err(SaverError::ContentValidation(format!(
                "multi-file saver cannot persist a {} result",
                other.shape()
            ))),
        }
    }

    fn code_type(&self) -> GenerationType {
        GenerationType::MultiFile
    }
}
