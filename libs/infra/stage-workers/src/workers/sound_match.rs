// [libs/infra/stage-workers/src/workers/sound_match.rs]
/*!
 * APARATO: SOUND MATCH WORKER
 * RESPONSABILIDAD: ADAPTADOR HTTP PARA EL MODELO DE EMPAREJAMIENTO DE SFX
 */

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use reelforge_core_workflow::{StageInput, StageOutput, StageWorker, StageWorkerError};
use reelforge_domain_models::{SceneDescriptor, SoundMatchOutput, SoundPlacement, StageId};

use crate::http::StageHttpClient;

#[derive(Serialize)]
struct SoundMatchRequest<'a> {
    scenes: &'a [SceneDescriptor],
}

#[derive(Deserialize)]
struct SoundMatchResponse {
    placements: Vec<SoundPlacement>,
}

pub struct SoundMatchWorker {
    http: StageHttpClient,
}

impl SoundMatchWorker {
    pub fn new(http: StageHttpClient) -> Self {
        Self { http }
    }
}

impl StageWorker for SoundMatchWorker {
    fn stage(&self) -> StageId {
        StageId::SoundMatch
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
            let StageInput::SoundMatch(body) = input else {
                return Err(StageWorkerError::Permanent("wrong input variant for SOUND_MATCH".into()));
            };
            let response: SoundMatchResponse = self
                .http
                .post_json("/v1/sound-match", &SoundMatchRequest { scenes: &body.scenes })
                .await
                .map_err(StageWorkerError::from)?;
            Ok(StageOutput::SoundMatch(SoundMatchOutput { placements: response.placements }))
        })
    }
}
