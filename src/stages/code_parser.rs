// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Extraction of code from free-text model answers.
//!
//! A fenced block opens with a line starting with three backticks followed by
//! an optional info string, and closes with a line holding only backticks.
//! An unterminated final block runs to the end of the answer.

use std::collections::BTreeMap;

use crate::saver::html::INDEX_FILE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub info: String,
    pub body: String,
}

impl CodeBlock {
    /// Language tag: the info string up to the first space or colon, lowercased.
    pub fn language(&self) -> String {
        self.info
            .split(|c: char| c.is_whitespace() || c == ':')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase()
    }
}

pub fn fenced_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        match open.take() {
            None => {
                if let Some(info) = trimmed.strip_prefix("```") {
                    open = Some((info.trim().to_string(), Vec::new()));
                }
            }
            Some((info, mut body)) => {
                if trimmed.starts_with("```") && trimmed.trim_matches('`').trim().is_empty() {
                    blocks.push(CodeBlock {
                        info,
                        body: body.join("\n"),
                    });
                } else {
                    body.push(line);
                    open = Some((info, body));
                }
            }
        }
    }

    if let Some((info, body)) = open {
        blocks.push(CodeBlock {
            info,
            body: body.join("\n"),
        });
    }
    blocks
}

fn looks_like_document(text: &str) -> bool {
    let lowered = text.trim_start().to_ascii_lowercase();
    lowered.starts_with("<!doctype html") || lowered.starts_with("<html")
}

/// The page from an HTML generation answer, or an empty string if there is none.
pub fn parse_html(text: &str) -> String {
    if let Some(block) = fenced_blocks(text)
        .into_iter()
        .find(|block| block.language() == "html")
    {
        return block.body;
    }
    if looks_like_document(text) {
        return text.trim().to_string();
    }
    String::new()
}

fn default_path(language: &str) -> Option<&'static str> {
    match language {
        "html" => Some(INDEX_FILE),
        "css" => Some("style.css"),
        "js" | "javascript" => Some("script.js"),
        _ => None,
    }
}

/// Target path for a block: named in the info string, or the language default.
fn block_path(block: &CodeBlock) -> Option<String> {
    let info = block.info.trim();
    let named = if let Some((_, path)) = info.split_once(':') {
        Some(path.trim())
    } else if let Some((_, path)) = info.split_once(char::is_whitespace) {
        Some(path.trim())
    } else if info.contains('.') || info.contains('/') {
        Some(info)
    } else {
        None
    };

    match named.filter(|path| !path.is_empty()) {
        Some(path) => Some(path.to_string()),
        None => default_path(&block.language()).map(str::to_string),
    }
}

/// Files from a multi-file answer. The first block for a path wins.
pub fn parse_multi_file(text: &str) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    for block in fenced_blocks(text) {
        match block_path(&block) {
            Some(path) => {
                files.entry(path).or_insert(block.body);
            }
            None => tracing::debug!(info = %block.info, "Ignoring code block without a file mapping"),
        }
    }
    files
}
