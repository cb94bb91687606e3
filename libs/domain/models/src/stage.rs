// [libs/domain/models/src/stage.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE STAGE TOPOLOGY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN SOBERANA DEL ORDEN FIJO DE ETAPAS
 *
 * El orden declarado en `ALL_STAGES` es la única fuente de verdad sobre
 * la secuencia del pipeline. El Stage Registry y el Workflow Engine
 * derivan su comportamiento de esta lista, nunca al revés.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Identificador soberano de una etapa del pipeline de producción.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StageId {
    ScriptParse,
    CharacterModel,
    Storyboard,
    LipSync,
    SoundMatch,
    Render,
}

/// Orden fijo y exhaustivo de las seis etapas. Toda iteración secuencial
/// del pipeline debe recorrer este arreglo, nunca un `HashMap` desordenado.
pub const ALL_STAGES: [StageId; 6] = [
    StageId::ScriptParse,
    StageId::CharacterModel,
    StageId::Storyboard,
    StageId::LipSync,
    StageId::SoundMatch,
    StageId::Render,
];

impl StageId {
    /// Peso nominal de duración declarado por el Stage Registry (§4.3).
    pub fn weight(self) -> u32 {
        match self {
            StageId::ScriptParse => 5,
            StageId::CharacterModel => 10,
            StageId::Storyboard => 40,
            StageId::LipSync => 15,
            StageId::SoundMatch => 5,
            StageId::Render => 25,
        }
    }

    /// Etapa inmediatamente posterior en la secuencia fija, o `None` si es la última.
    pub fn next(self) -> Option<StageId> {
        let index = ALL_STAGES.iter().position(|s| *s == self)?;
        ALL_STAGES.get(index + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::ScriptParse => "SCRIPT_PARSE",
            StageId::CharacterModel => "CHARACTER_MODEL",
            StageId::Storyboard => "STORYBOARD",
            StageId::LipSync => "LIP_SYNC",
            StageId::SoundMatch => "SOUND_MATCH",
            StageId::Render => "RENDER",
        }
    }
}

/// Puntero de avance del Workflow Engine: una etapa concreta, o el estado
/// terminal en el que todas las etapas poseen una salida registrada.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurrentStage {
    Stage(StageId),
    Terminal,
}

pub const TOTAL_STAGE_WEIGHT: u32 = {
    let mut total = 0u32;
    let mut i = 0;
    while i < ALL_STAGES.len() {
        total += ALL_STAGES[i].weight();
        i += 1;
    }
    total
};
