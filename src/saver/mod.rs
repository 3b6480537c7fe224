// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Persistence of generation results, one strategy per generation type.
//!
//! [`SaverRegistry`] maps every [`GenerationType`] to exactly one
//! [`CodeSaver`](crate::traits::CodeSaver) and owns the validate-then-write
//! sequence. [`OutputLayout`] names the deterministic directories results are
//! written to.

use std::collections::BTreeMap;

pub mod html;
pub mod layout;
pub mod multi_file;
pub mod project;
pub mod registry;

pub use html::HtmlSaver;
pub use layout::OutputLayout;
pub use multi_file::MultiFileSaver;
pub use project::ProjectSaver;
pub use registry::SaverRegistry;

/// Output of the code generator, consumed once by a saver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// One self-contained page.
    Html { html: String },
    /// Static site files keyed by relative path.
    MultiFile { files: BTreeMap<String, String> },
    /// Framework project snapshot keyed by relative path.
    Project { files: BTreeMap<String, String> },
}

impl GenerationResult {
    pub fn shape(&self) -> &'static str {
        match self {
            GenerationResult::Html { .. } => "html",
            GenerationResult::MultiFile { .. } => "multi_file",
            GenerationResult::Project { .. } => "project",
        }
    }

    pub fn file_count(&self) -> usize {
        match self {
            GenerationResult::Html { .. } => 1,
            GenerationResult::MultiFile { files } | GenerationResult::Project { files } => {
                files.len()
            }
        }
    }
}
