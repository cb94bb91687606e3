// [libs/infra/stage-workers/src/lib.rs]
/*!
 * =================================================================
 * APARATO: STAGE WORKERS LIBRARY BARREL (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LIB (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DE LOS SEIS ADAPTADORES DE ETAPA
 *
 * Cada adaptador implementa `reelforge_core_workflow::StageWorker` sobre
 * un `StageHttpClient` propio — mismo cliente HTTP, distinto `base_url`
 * y distinta forma de entrada/salida por etapa.
 * =================================================================
 */

pub mod errors;
pub mod http;
pub mod workers;

pub use errors::AdapterError;
pub use http::StageHttpClient;
pub use workers::{
    CharacterModelWorker, LipSyncWorker, RenderWorker, ScriptParseWorker, SoundMatchWorker, StoryboardWorker,
};
