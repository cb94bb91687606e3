// [libs/infra/stage-workers/src/workers/storyboard.rs]
/*!
 * APARATO: STORYBOARD WORKER
 * RESPONSABILIDAD: ADAPTADOR HTTP PARA EL MODELO DE GENERACIÓN DE FRAMES
 */

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use reelforge_core_workflow::{StageInput, StageOutput, StageWorker, StageWorkerError};
use reelforge_domain_models::{CharacterFeatureModel, SceneDescriptor, StageId, StoryboardFrame, StoryboardOutput};

use crate::http::StageHttpClient;

#[derive(Serialize)]
struct StoryboardRequest<'a> {
    scenes: &'a [SceneDescriptor],
    characters: &'a [CharacterFeatureModel],
}

#[derive(Deserialize)]
struct StoryboardResponse {
    frames: Vec<StoryboardFrame>,
}

pub struct StoryboardWorker {
    http: StageHttpClient,
}

impl StoryboardWorker {
    pub fn new(http: StageHttpClient) -> Self {
        Self { http }
    }
}

impl StageWorker for StoryboardWorker {
    fn stage(&self) -> StageId {
        StageId::Storyboard
    }

    fn execute<'a>(
        &'a self,
        input: StageInput,
        cancel: watch::Receiver<bool>,
    ) -> BoxFuture<'a, Result<StageOutput, StageWorkerError>> {
        Box::pin(async move {
            if *cancel.borrow() {
                return Err(StageWorkerError::Permanent("cancelled before dispatch".into()));
            }
            let StageInput::Storyboard(body) = input else {
                return Err(StageWorkerError::Permanent("wrong input variant for STORYBOARD".into()));
            };
            let response: StoryboardResponse = self
                .http
                .post_json(
                    "/v1/storyboard",
                    &StoryboardRequest { scenes: &body.scenes, characters: &body.characters },
                )
                .await
                .map_err(StageWorkerError::from)?;
            Ok(StageOutput::Storyboard(StoryboardOutput { frames: response.frames }))
        })
    }
}
