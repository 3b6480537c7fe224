// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::WorkflowError;
use crate::traits::{Stage, StageName};
use crate::workflow::runtime::StageRuntime;
use crate::workflow::{ImageCategory, ImageResource, WorkflowContext};

const SECTIONS: [(ImageCategory, &str); 4] = [
    (ImageCategory::Content, "Content images"),
    (ImageCategory::Logo, "Logos"),
    (ImageCategory::Illustration, "Illustrations"),
    (ImageCategory::Architecture, "Architecture diagrams"),
];

/// Append the collected image assets, grouped by category, to the prompt.
pub fn enhance(prompt: &str, images: &[ImageResource]) -> String {
    if images.is_empty() {
        return prompt.to_string();
    }

    let mut enhanced = format!(
        "{}\n\n## Available image assets\nUse these images where they fit the page.\n",
        prompt
    );
    for (category, title) in SECTIONS {
        let members: Vec<&ImageResource> =
            images.iter().filter(|image| image.category == category).collect();
        if members.is_empty() {
            continue;
        }
        enhanced.push_str(&format!("\n### {}\n", title));
        for image in members {
            enhanced.push_str(&format!("- {}: {}\n", image.description, image.url));
        }
    }
    enhanced
}

/// Deterministic; makes no model call.
pub struct PromptEnhancerStage;

#[async_trait]
impl Stage for PromptEnhancerStage {
    async fn run(&self, ctx: &mut WorkflowContext, _rt: &StageRuntime) -> Result<(), WorkflowError> {
        let enhanced = enhance(ctx.original_prompt(), ctx.image_list().unwrap_or(&[]));
        ctx.set_enhanced_prompt(enhanced)
    }

    fn name(&self) -> StageName {
        StageName::PromptEnhancer
    }
}
