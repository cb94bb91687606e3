// [libs/core/workflow/src/worker.rs]
/*!
 * APARATO: STAGE WORKER CONTRATO
 * CLASIFICACIÓN: CORE LOGIC (ESTRATO L2-CORE)
 * RESPONSABILIDAD: FRONTERA ENTRE EL MOTOR Y LOS MODELOS DE IA EXTERNOS
 *
 * Un `StageWorker` por `StageId`, inyectado en el `StageRegistry` como
 * `Arc<dyn StageWorker>` (§9 "Global service singletons" → grafo de
 * dependencias explícito). Usa `BoxFuture` en vez de `async-trait`, que el
 * workspace no adopta en ningún otro punto de frontera dinámica.
 */

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::sync::watch;

use reelforge_domain_models::{
    ArtifactRef, CharacterFeatureModel, CharacterModelOutput, LipSyncOutput, ProductionConfig,
    RenderOutput, SceneDescriptor, SoundMatchOutput, SoundPlacement, StageId, StoryboardFrame,
    StoryboardOutput,
};

/// Un error del worker se clasifica en la frontera como transitorio
/// (reintentable per la política de §4.3) o permanente. `Timeout` se trata
/// como transitorio per §5 "Timeouts".
#[derive(Debug, Error)]
pub enum StageWorkerError {
    #[error("[STAGE_TRANSIENT_FAULT]: {0}")]
    Transient(String),

    #[error("[STAGE_PERMANENT_FAULT]: {0}")]
    Permanent(String),

    #[error("[STAGE_TIMEOUT_FAULT]: exceeded wall-clock budget")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct ScriptParseInput {
    pub script: String,
}

#[derive(Debug, Clone)]
pub struct CharacterModelInput {
    pub character_refs: Vec<ArtifactRef>,
}

#[derive(Debug, Clone)]
pub struct StoryboardInput {
    pub scenes: Vec<SceneDescriptor>,
    pub characters: Vec<CharacterFeatureModel>,
}

#[derive(Debug, Clone)]
pub struct LipSyncInput {
    pub narration_ref: Option<ArtifactRef>,
    pub frames: Vec<StoryboardFrame>,
}

#[derive(Debug, Clone)]
pub struct SoundMatchInput {
    pub scenes: Vec<SceneDescriptor>,
}

#[derive(Debug, Clone)]
pub struct RenderInput {
    pub frames: Vec<StoryboardFrame>,
    pub narration_ref: Option<ArtifactRef>,
    pub placements: Vec<SoundPlacement>,
    pub config: ProductionConfig,
}

/// Unión de las entradas de las seis etapas; producida por
/// `registry::input_selector`.
#[derive(Debug, Clone)]
pub enum StageInput {
    ScriptParse(ScriptParseInput),
    CharacterModel(CharacterModelInput),
    Storyboard(StoryboardInput),
    LipSync(LipSyncInput),
    SoundMatch(SoundMatchInput),
    Render(RenderInput),
}

impl StageInput {
    pub fn stage(&self) -> StageId {
        match self {
            StageInput::ScriptParse(_) => StageId::ScriptParse,
            StageInput::CharacterModel(_) => StageId::CharacterModel,
            StageInput::Storyboard(_) => StageId::Storyboard,
            StageInput::LipSync(_) => StageId::LipSync,
            StageInput::SoundMatch(_) => StageId::SoundMatch,
            StageInput::Render(_) => StageId::Render,
        }
    }
}

/// Unión de las salidas de las seis etapas, portadas de vuelta al motor
/// antes de ser volcadas en el campo correspondiente de `StageOutputs`.
pub enum StageOutput {
    ScriptParse(reelforge_domain_models::ScriptParseOutput),
    CharacterModel(CharacterModelOutput),
    Storyboard(StoryboardOutput),
    LipSync(LipSyncOutput),
    SoundMatch(SoundMatchOutput),
    Render(RenderOutput),
}

/// Contrato que cada modelo de IA externo (fuera de alcance de este
/// workspace, ver §1) implementa vía un adaptador reqwest delgado en
/// `reelforge-infra-stage-workers`.
pub trait StageWorker: Send + Sync {
    fn stage(&self) -> StageId;

    /// `cancel` se resuelve a `true` cuando el motor solicitó abortar esta
    /// producción; los workers de larga duración deben sondearlo entre
    /// unidades de trabajo internas y retornar `Err(Permanent(..))` o
    /// simplemente dejar que el motor descarte la salida al regresar.
    fn execute<'a>(
        &'a self,
        input: StageInput,
        cancel: watch::Receiver<bool>,
    ) -> BoxFuture<'a, Result<StageOutput, StageWorkerError>>;
}
