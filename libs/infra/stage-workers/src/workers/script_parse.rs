// [libs/infra/stage-workers/src/workers/script_parse.rs]
/*!
 * APARATO: SCRIPT PARSE WORKER
 * RESPONSABILIDAD: ADAPTADOR HTTP PARA EL MODELO DE SEGMENTACIÓN DE GUION
 */

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use reelforge_core_workflow::{StageInput, StageOutput, StageWorker, StageWorkerError};
use reelforge_domain_models::{ScriptParseOutput, SceneDescriptor, StageId};

use crate::http::StageHttpClient;

#[derive(Serialize)]
struct ScriptParseRequest<'a> {
    script: &'a str,
}

#[derive(Deserialize)]
struct ScriptParseResponse {
    scenes: Vec<SceneDescriptor>,
}

pub struct ScriptParseWorker {
    http: StageHttpClient,
}

impl ScriptParseWorker {
    pub fn new(http: StageHttpClient) -> Self {
        Self { http }
    }
}

impl StageWorker for ScriptParseWorker {
    fn stage(&self) -> StageId {
        StageId::ScriptParse
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
            let StageInput::ScriptParse(body) = input else {
                return Err(StageWorkerError::Permanent("wrong input variant for SCRIPT_PARSE".into()));
            };
            let response: ScriptParseResponse = self
                .http
                .post_json("/v1/script-parse", &ScriptParseRequest { script: &body.script })
                .await
                .map_err(StageWorkerError::from)?;
            Ok(StageOutput::ScriptParse(ScriptParseOutput { scenes: response.scenes }))
        })
    }
}
