// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Suggests image assets for the page. Best-effort: an answer that cannot be
//! parsed yields an empty list, while transport failures still fail the stage.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::WorkflowError;
use crate::model::prompt::{IMAGE_COLLECTION_SYSTEM, IMAGE_COLLECTION_USER};
use crate::model::{parse_structured, Message, ModelRequest, Purpose};
use crate::observability::messages::{stages::DegradedAnswer, StructuredLog};
use crate::traits::{Stage, StageName};
use crate::workflow::runtime::StageRuntime;
use crate::workflow::{ImageResource, WorkflowContext};

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageAnswer {
    Wrapped { images: Vec<ImageResource> },
    Bare(Vec<ImageResource>),
}

pub struct ImageCollectorStage;

#[async_trait]
impl Stage for ImageCollectorStage {
    async fn run(&self, ctx: &mut WorkflowContext, rt: &StageRuntime) -> Result<(), WorkflowError> {
        let settings = &rt.settings().images;
        if !settings.enabled || settings.max_images == 0 {
            return ctx.set_image_list(Vec::new());
        }

        let max_images = settings.max_images.to_string();
        let system = IMAGE_COLLECTION_SYSTEM.render(&[("max_images", &max_images)])?;
        let user = IMAGE_COLLECTION_USER.render(&[("prompt", ctx.original_prompt())])?;
        let request = ModelRequest::new(
            Purpose::ImageCollection,
            vec![Message::system(system), Message::user(user)],
        )
        .json();

        let turn = rt.call_model(request).await?;
        let mut images = match parse_structured::<ImageAnswer>(&turn.content) {
            Ok(ImageAnswer::Wrapped { images }) | Ok(ImageAnswer::Bare(images)) => images,
            Err(error) => {
                DegradedAnswer {
                    stage: self.name().as_str(),
                    fallback: "an empty image list",
                    error: &error,
                }
                .log();
                Vec::new()
            }
        };
        images.retain(|image| !image.url.trim().is_empty());
        images.truncate(settings.max_images);

        ctx.set_image_list(images)
    }

    fn name(&self) -> StageName {
        StageName::ImageCollector
    }
}
