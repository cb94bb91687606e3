// [libs/infra/stage-workers/src/workers/lip_sync.rs]
/*!
 * APARATO: LIP SYNC WORKER
 * RESPONSABILIDAD: ADAPTADOR HTTP PARA EL MODELO DE SINCRONIZACIÓN LABIAL
 *
 * Nunca invocado cuando la producción carece de `narration_ref` —
 * `registry::is_skippable` retiene esa decisión aguas arriba.
 */

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use reelforge_core_workflow::{StageInput, StageOutput, StageWorker, StageWorkerError};
use reelforge_domain_models::{ArtifactRef, LipSyncKeyframe, LipSyncOutput, StageId, StoryboardFrame};

use crate::http::StageHttpClient;

#[derive(Serialize)]
struct LipSyncRequest<'a> {
    narration_ref: &'a Option<ArtifactRef>,
    frames: &'a [StoryboardFrame],
}

#[derive(Deserialize)]
struct LipSyncResponse {
    keyframes_by_character: Vec<(String, Vec<LipSyncKeyframe>)>,
}

pub struct LipSyncWorker {
    http: StageHttpClient,
}

impl LipSyncWorker {
    pub fn new(http: StageHttpClient) -> Self {
        Self { http }
    }
}

impl StageWorker for LipSyncWorker {
    fn stage(&self) -> StageId {
        StageId::LipSync
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
            let StageInput::LipSync(body) = input else {
                return Err(StageWorkerError::Permanent("wrong input variant for LIP_SYNC".into()));
            };
            let response: LipSyncResponse = self
                .http
                .post_json(
                    "/v1/lip-sync",
                    &LipSyncRequest { narration_ref: &body.narration_ref, frames: &body.frames },
                )
                .await
                .map_err(StageWorkerError::from)?;
            Ok(StageOutput::LipSync(LipSyncOutput {
                keyframes_by_character: response.keyframes_by_character,
            }))
        })
    }
}
