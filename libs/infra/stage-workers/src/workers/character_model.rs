// [libs/infra/stage-workers/src/workers/character_model.rs]
/*!
 * APARATO: CHARACTER MODEL WORKER
 * RESPONSABILIDAD: ADAPTADOR HTTP PARA EL MODELO DE CONSISTENCIA FACIAL
 */

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use reelforge_core_workflow::{StageInput, StageOutput, StageWorker, StageWorkerError};
use reelforge_domain_models::{ArtifactRef, CharacterFeatureModel, CharacterModelOutput, StageId};

use crate::http::StageHttpClient;

#[derive(Serialize)]
struct CharacterModelRequest<'a> {
    character_refs: &'a [ArtifactRef],
}

#[derive(Deserialize)]
struct CharacterModelResponse {
    characters: Vec<CharacterFeatureModel>,
}

pub struct CharacterModelWorker {
    http: StageHttpClient,
}

impl CharacterModelWorker {
    pub fn new(http: StageHttpClient) -> Self {
        Self { http }
    }
}

impl StageWorker for CharacterModelWorker {
    fn stage(&self) -> StageId {
        StageId::CharacterModel
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
            let StageInput::CharacterModel(body) = input else {
                return Err(StageWorkerError::Permanent("wrong input variant for CHARACTER_MODEL".into()));
            };
            let response: CharacterModelResponse = self
                .http
                .post_json(
                    "/v1/character-model",
                    &CharacterModelRequest { character_refs: &body.character_refs },
                )
                .await
                .map_err(StageWorkerError::from)?;
            Ok(StageOutput::CharacterModel(CharacterModelOutput {
                characters: response.characters,
            }))
        })
    }
}
