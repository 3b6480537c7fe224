// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Prompt templates with `{{name}}` placeholders.
//!
//! Rendering substitutes every named parameter and fails if any placeholder is
//! left unresolved, so a template never reaches the model half-filled.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ModelError;
use crate::workflow::GenerationType;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub text: &'static str,
}

impl PromptTemplate {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self { name, text }
    }

    pub fn render(&self, params: &[(&str, &str)]) -> Result<String, ModelError> {
        let mut missing = None;
        let rendered = PLACEHOLDER.replace_all(self.text, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            match params.iter().find(|(name, _)| *name == key) {
                Some((_, value)) => (*value).to_string(),
                None => {
                    missing.get_or_insert_with(|| key.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(parameter) => Err(ModelError::MissingTemplateParameter {
                template: self.name.to_string(),
                parameter,
            }),
            None => Ok(rendered.into_owned()),
        }
    }
}

pub const IMAGE_COLLECTION_SYSTEM: PromptTemplate = PromptTemplate::new(
    "image_collection_system",
    "You plan visual assets for a web page. Answer with JSON only, shaped as \
{\"images\": [{\"category\": \"CONTENT|LOGO|ILLUSTRATION|ARCHITECTURE\", \"description\": \"...\", \"url\": \"https://...\"}]}. \
Suggest at most {{max_images}} images. Use an empty list when no images fit.",
);

pub const IMAGE_COLLECTION_USER: PromptTemplate =
    PromptTemplate::new("image_collection_user", "Page request:\n{{prompt}}");

pub const ROUTING_SYSTEM: PromptTemplate = PromptTemplate::new(
    "routing_system",
    "Classify the web generation request into exactly one type. \
Answer with one of: html, multi_file, vue_project, react_project. \
Use html for a single simple page, multi_file for a static site split into HTML, CSS and JavaScript, \
vue_project or react_project for an application that needs a framework and a build step. \
Answer with the bare value and nothing else.",
);

pub const ROUTING_USER: PromptTemplate = PromptTemplate::new("routing_user", "{{prompt}}");

pub const HTML_SYSTEM: PromptTemplate = PromptTemplate::new(
    "html_system",
    "You are a front-end engineer. Produce one complete, self-contained HTML page with inline CSS and JavaScript. \
Return the page inside a single ```html fenced block, optionally preceded by one short sentence.",
);

pub const MULTI_FILE_SYSTEM: PromptTemplate = PromptTemplate::new(
    "multi_file_system",
    "You are a front-end engineer. Produce a static site as three files: index.html, style.css and script.js. \
Return each file in its own fenced block tagged html, css and js respectively. \
index.html must reference style.css and script.js by relative path.",
);

pub const PROJECT_SYSTEM: PromptTemplate = PromptTemplate::new(
    "project_system",
    "You are a front-end engineer building a {{framework}} project with Vite. \
Create every file with the file_operation tool using paths relative to the project root. \
The project must contain package.json with \"dev\" and \"build\" scripts, index.html and a src/ directory. \
Use read before modify, and pass the file's exact current content as oldContent. \
When every file is written, answer with a short summary and no further tool calls.",
);

pub const GENERATION_USER: PromptTemplate = PromptTemplate::new("generation_user", "{{prompt}}");

pub const GENERATION_RETRY_USER: PromptTemplate = PromptTemplate::new(
    "generation_retry_user",
    "{{prompt}}\n\nThe previous attempt failed review. Fix these problems:\n{{errors}}",
);

pub const QUALITY_SYSTEM: PromptTemplate = PromptTemplate::new(
    "quality_system",
    "You review generated web code for syntax errors, broken references and missing required files. \
Answer with JSON only: {\"is_valid\": true|false, \"errors\": [\"...\"], \"suggestions\": [\"...\"]}.",
);

pub const QUALITY_USER: PromptTemplate =
    PromptTemplate::new("quality_user", "Generation type: {{generation_type}}\n\n{{files}}");

/// System prompt for the code generator of a given output shape.
pub fn generation_system_prompt(kind: GenerationType) -> Result<String, ModelError> {
    match kind {
        GenerationType::Html => HTML_SYSTEM.render(&[]),
        GenerationType::MultiFile => MULTI_FILE_SYSTEM.render(&[]),
        GenerationType::VueProject => PROJECT_SYSTEM.render(&[("framework", "Vue 3")]),
        GenerationType::ReactProject => PROJECT_SYSTEM.render(&[("framework", "React 18")]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_parameters() {
        let template = PromptTemplate::new("t", "Hi {{ name }}, build {{thing}} for {{name}}");
        let rendered = template
            .render(&[("name", "Ada"), ("thing", "a bakery page")])
            .unwrap();
        assert_eq!(rendered, "Hi Ada, build a bakery page for Ada");
    }

    #[test]
    fn test_render_fails_on_missing_parameter() {
        let err = ROUTING_USER.render(&[]).unwrap_err();
        match err {
            ModelError::MissingTemplateParameter { template, parameter } => {
                assert_eq!(template, "routing_user");
                assert_eq!(parameter, "prompt");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_literal_json_braces_untouched() {
        let rendered = IMAGE_COLLECTION_SYSTEM.render(&[("max_images", "3")]).unwrap();
        assert!(rendered.contains("{\"images\": ["));
        assert!(rendered.contains("at most 3 images"));
    }

    #[test]
    fn test_every_generation_type_has_a_system_prompt() {
        for kind in GenerationType::ALL {
            let prompt = generation_system_prompt(kind).unwrap();
            assert!(!prompt.contains("{{"), "unrendered placeholder for {}", kind);
        }
    }
}
