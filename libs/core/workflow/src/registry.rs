// [libs/core/workflow/src/registry.rs]
/*!
 * APARATO: STAGE REGISTRY
 * CLASIFICACIÓN: CORE LOGIC (ESTRATO L2-CORE)
 * RESPONSABILIDAD: ORDEN FIJO DE ETAPAS, SELECCIÓN DE ENTRADA, POLÍTICA
 *
 * Seis variantes de `StageId` en `match` exhaustivo (§9 "Dynamic dispatch
 * on enum tags" → tagged variants + match), cada una resuelta a un
 * `Arc<dyn StageWorker>` inyectado al construir el `StageRegistry`.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reelforge_domain_models::{Production, StageId};

use crate::errors::WorkflowError;
use crate::worker::{
    CharacterModelInput, LipSyncInput, RenderInput, ScriptParseInput, SoundMatchInput, StageInput,
    StageWorker, StoryboardInput,
};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
        }
    }
}

/// Presupuesto de tiempo por etapa (§5 "Timeouts"): 10 minutos por defecto,
/// 30 para `RENDER`.
pub fn timeout_for(stage: StageId) -> Duration {
    match stage {
        StageId::Render => Duration::from_secs(30 * 60),
        _ => Duration::from_secs(10 * 60),
    }
}

/// `LIP_SYNC` es la única etapa omisible, y solo cuando la producción no
/// trae audio de narración (§4.3).
pub fn is_skippable(production: &Production, stage: StageId) -> bool {
    matches!(stage, StageId::LipSync) && production.narration_ref.is_none()
}

/// Construye la entrada de una etapa a partir del estado acumulado de la
/// producción. Falla con `MissingPrerequisite` si una etapa anterior aún no
/// registró su salida.
pub fn input_selector(production: &Production, stage: StageId) -> Result<StageInput, WorkflowError> {
    match stage {
        StageId::ScriptParse => Ok(StageInput::ScriptParse(ScriptParseInput {
            script: production.script.clone(),
        })),
        StageId::CharacterModel => Ok(StageInput::CharacterModel(CharacterModelInput {
            character_refs: production.character_refs.clone(),
        })),
        StageId::Storyboard => {
            let script_parse = production
                .stage_outputs
                .script_parse
                .clone()
                .ok_or(WorkflowError::MissingPrerequisite(StageId::ScriptParse))?;
            let character_model = production
                .stage_outputs
                .character_model
                .clone()
                .ok_or(WorkflowError::MissingPrerequisite(StageId::CharacterModel))?;
            Ok(StageInput::Storyboard(StoryboardInput {
                scenes: script_parse.scenes,
                characters: character_model.characters,
            }))
        }
        StageId::LipSync => {
            let storyboard = production
                .stage_outputs
                .storyboard
                .clone()
                .ok_or(WorkflowError::MissingPrerequisite(StageId::Storyboard))?;
            Ok(StageInput::LipSync(LipSyncInput {
                narration_ref: production.narration_ref.clone(),
                frames: storyboard.frames,
            }))
        }
        StageId::SoundMatch => {
            let script_parse = production
                .stage_outputs
                .script_parse
                .clone()
                .ok_or(WorkflowError::MissingPrerequisite(StageId::ScriptParse))?;
            Ok(StageInput::SoundMatch(SoundMatchInput {
                scenes: script_parse.scenes,
            }))
        }
        StageId::Render => {
            let storyboard = production
                .stage_outputs
                .storyboard
                .clone()
                .ok_or(WorkflowError::MissingPrerequisite(StageId::Storyboard))?;
            let sound_match = production
                .stage_outputs
                .sound_match
                .clone()
                .ok_or(WorkflowError::MissingPrerequisite(StageId::SoundMatch))?;
            Ok(StageInput::Render(RenderInput {
                frames: storyboard.frames,
                narration_ref: production.narration_ref.clone(),
                placements: sound_match.placements,
                config: production.config.clone(),
            }))
        }
    }
}

pub struct StageSpec {
    pub worker: Arc<dyn StageWorker>,
    pub retry_policy: RetryPolicy,
    pub timeout: Duration,
}

/// Mantiene un `Arc<dyn StageWorker>` por cada una de las seis etapas. La
/// construcción falla si falta alguna, en vez de dejar que `worker()`
/// entre en pánico en producción.
pub struct StageRegistry {
    specs: HashMap<StageId, StageSpec>,
}

impl StageRegistry {
    pub fn new(workers: HashMap<StageId, Arc<dyn StageWorker>>) -> Result<Self, WorkflowError> {
        let mut specs = HashMap::with_capacity(reelforge_domain_models::ALL_STAGES.len());
        for stage in reelforge_domain_models::ALL_STAGES {
            let worker = workers.get(&stage).cloned().ok_or_else(|| {
                WorkflowError::RegistryIncomplete(format!("no worker registered for {stage:?}"))
            })?;
            specs.insert(
                stage,
                StageSpec {
                    worker,
                    retry_policy: RetryPolicy::default(),
                    timeout: timeout_for(stage),
                },
            );
        }
        Ok(Self { specs })
    }

    pub fn spec(&self, stage: StageId) -> &StageSpec {
        self.specs
            .get(&stage)
            .expect("StageRegistry::new guarantees an entry for every StageId")
    }

    pub fn input_selector(&self, production: &Production, stage: StageId) -> Result<StageInput, WorkflowError> {
        input_selector(production, stage)
    }

    pub fn is_skippable(&self, production: &Production, stage: StageId) -> bool {
        is_skippable(production, stage)
    }
}
