// [libs/infra/stage-workers/src/workers/render.rs]
/*!
 * APARATO: RENDER WORKER
 * RESPONSABILIDAD: ADAPTADOR HTTP PARA EL MOTOR DE RENDER FINAL
 *
 * La única etapa no omisible (§4.3) y la de mayor presupuesto de tiempo
 * (30 minutos, ver `registry::timeout_for`). El Workflow Engine ya
 * debitó la quota del tenant antes de invocar este worker; una falla
 * permanente aquí dispara el reembolso simétrico en `engine::step`.
 */

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use reelforge_core_workflow::{StageInput, StageOutput, StageWorker, StageWorkerError};
use reelforge_domain_models::{ArtifactRef, ProductionConfig, RenderOutput, SoundPlacement, StageId, StoryboardFrame};

use crate::http::StageHttpClient;

#[derive(Serialize)]
struct RenderRequest<'a> {
    frames: &'a [StoryboardFrame],
    narration_ref: &'a Option<ArtifactRef>,
    placements: &'a [SoundPlacement],
    config: &'a ProductionConfig,
}

#[derive(Deserialize)]
struct RenderResponse {
    artifact: ArtifactRef,
    rendered_minutes: f64,
}

pub struct RenderWorker {
    http: StageHttpClient,
}

impl RenderWorker {
    pub fn new(http: StageHttpClient) -> Self {
        Self { http }
    }
}

impl StageWorker for RenderWorker {
    fn stage(&self) -> StageId {
        StageId::Render
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
            let StageInput::Render(body) = input else {
                return Err(StageWorkerError::Permanent("wrong input variant for RENDER".into()));
            };
            let response: RenderResponse = self
                .http
                .post_json(
                    "/v1/render",
                    &RenderRequest {
                        frames: &body.frames,
                        narration_ref: &body.narration_ref,
                        placements: &body.placements,
                        config: &body.config,
                    },
                )
                .await
                .map_err(StageWorkerError::from)?;
            Ok(StageOutput::Render(RenderOutput {
                artifact: response.artifact,
                rendered_minutes: response.rendered_minutes,
            }))
        })
    }
}
