// [libs/domain/models/src/production.rs]
/*!
 * =================================================================
 * APARATO: PRODUCTION AGGREGATE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: ENTIDAD RAÍZ DEL PIPELINE DE PRODUCCIÓN DE VIDEO
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::errors::ModelError;
use crate::ids::{ProductionId, TenantId};
use crate::stage::{CurrentStage, StageId};

/// Referencia opaca a un blob gestionado por el Artifact Store. El dominio
/// nunca interpreta el contenido, solo lo transporta.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ArtifactRef(pub String);

impl ArtifactRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    Nine16,
    Sixteen9,
    One1,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RenderQuality {
    P720,
    P1080,
    K4,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RenderFormat {
    Mp4,
    Mov,
}

/// Parámetros de render elegidos por el operador al crear la producción.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionConfig {
    pub aspect: AspectRatio,
    pub quality: RenderQuality,
    pub format: RenderFormat,
    /// Minutos objetivo del corte final, acotado a `[0.5, 10.0]` con tres
    /// decimales de precisión (coincide con la semántica numérica de §4.2).
    pub target_minutes: f64,
}

impl ProductionConfig {
    pub fn new(
        aspect: AspectRatio,
        quality: RenderQuality,
        format: RenderFormat,
        target_minutes: f64,
    ) -> Result<Self, ModelError> {
        let rounded = (target_minutes * 1000.0).round() / 1000.0;
        if !(0.5..=10.0).contains(&rounded) {
            return Err(ModelError::TargetMinutesOutOfRange(target_minutes));
        }
        Ok(Self {
            aspect,
            quality,
            format,
            target_minutes: rounded,
        })
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Created,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

/// Catálogo de motivos de fallo usado tanto en `LastError` como en los
/// errores de frontera que las capas de infraestructura traducen hacia él
/// (ver §7 de la especificación).
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    VersionConflict,
    InsufficientQuota,
    DeclinedByUser,
    MissingPrerequisite,
    StageTransient,
    StagePermanent,
    StageTimeout,
    InvalidInput,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastError {
    pub stage: Option<StageId>,
    pub kind: ErrorKind,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneDescriptor {
    pub scene_id: String,
    pub scene_type: String,
    pub actions: Vec<String>,
    pub emotions: Vec<String>,
    pub keywords: Vec<String>,
    pub duration_estimate_seconds: f64,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptParseOutput {
    pub scenes: Vec<SceneDescriptor>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterFeatureModel {
    pub character_id: String,
    pub feature_reference: ArtifactRef,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterModelOutput {
    pub characters: Vec<CharacterFeatureModel>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryboardFrame {
    pub frame_index: u32,
    pub scene_id: String,
    pub artifact: ArtifactRef,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryboardOutput {
    pub frames: Vec<StoryboardFrame>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LipSyncKeyframe {
    pub time_offset_ms: u64,
    pub mouth_shape: String,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LipSyncOutput {
    /// Vacío cuando la etapa fue omitida (sin `narration_ref` en la
    /// producción) — `is_skippable` en el Stage Registry, no ausencia del
    /// struct-of-optionals en sí.
    pub keyframes_by_character: Vec<(String, Vec<LipSyncKeyframe>)>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoundPlacement {
    pub scene_id: String,
    pub effect_id: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoundMatchOutput {
    pub placements: Vec<SoundPlacement>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderOutput {
    pub artifact: ArtifactRef,
    pub rendered_minutes: f64,
}

/// Struct-of-optionals: cada campo solo se llena cuando su etapa concluye,
/// en el orden fijo de `ALL_STAGES`. El compilador no puede impedir que un
/// llamador escriba `render` sin `script_parse`, pero
/// `Production::validate_invariants` lo detecta en tiempo de ejecución.
#[typeshare]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageOutputs {
    pub script_parse: Option<ScriptParseOutput>,
    pub character_model: Option<CharacterModelOutput>,
    pub storyboard: Option<StoryboardOutput>,
    pub lip_sync: Option<LipSyncOutput>,
    pub sound_match: Option<SoundMatchOutput>,
    pub render: Option<RenderOutput>,
}

impl StageOutputs {
    pub fn has(&self, stage: StageId) -> bool {
        match stage {
            StageId::ScriptParse => self.script_parse.is_some(),
            StageId::CharacterModel => self.character_model.is_some(),
            StageId::Storyboard => self.storyboard.is_some(),
            StageId::LipSync => self.lip_sync.is_some(),
            StageId::SoundMatch => self.sound_match.is_some(),
            StageId::Render => self.render.is_some(),
        }
    }

    /// Primera etapa de `ALL_STAGES` sin salida registrada, o `Terminal` si
    /// todas están completas. Esta es la única fuente de verdad para derivar
    /// `current_stage` tras persistir una salida de etapa.
    pub fn next_stage(&self) -> CurrentStage {
        for stage in crate::stage::ALL_STAGES {
            if !self.has(stage) {
                return CurrentStage::Stage(stage);
            }
        }
        CurrentStage::Terminal
    }

    /// Verifica la invariante de orden: si una etapa posterior tiene salida,
    /// toda etapa anterior también debe tenerla. Usado como defensa en
    /// profundidad además de la construcción incremental vía `next_stage`.
    pub fn validate_order(&self) -> bool {
        let mut seen_gap = false;
        for stage in crate::stage::ALL_STAGES {
            if self.has(stage) {
                if seen_gap {
                    return false;
                }
            } else {
                seen_gap = true;
            }
        }
        true
    }
}

/// Entidad raíz: una producción en curso a través del pipeline de seis
/// etapas, propiedad de un `TenantAccount`.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Production {
    pub id: ProductionId,
    pub tenant_id: TenantId,
    pub script: String,
    pub character_refs: Vec<ArtifactRef>,
    pub narration_ref: Option<ArtifactRef>,
    pub config: ProductionConfig,
    pub status: ProductionStatus,
    pub current_stage: CurrentStage,
    pub stage_outputs: StageOutputs,
    /// Contador de versión para control de concurrencia optimista (CAS en
    /// el Production Store).
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_error: Option<LastError>,
    /// Costo debitado por `commit_debit` en la etapa `RENDER`, retenido para
    /// auditoría incluso después de que la producción completa (§4.6 paso 6).
    /// `None` hasta que `RENDER` debita quota por primera vez.
    pub render_cost_debited: Option<f64>,
}

impl Production {
    pub fn new(
        tenant_id: TenantId,
        script: String,
        character_refs: Vec<ArtifactRef>,
        narration_ref: Option<ArtifactRef>,
        config: ProductionConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProductionId::new(),
            tenant_id,
            script,
            character_refs,
            narration_ref,
            config,
            status: ProductionStatus::Created,
            current_stage: CurrentStage::Stage(StageId::ScriptParse),
            stage_outputs: StageOutputs::default(),
            version: 0,
            created_at: now,
            updated_at: now,
            last_error: None,
            render_cost_debited: None,
        }
    }

    /// Defensa en profundidad: invariante 1 de §8 (orden de `stage_outputs`)
    /// más la coherencia entre `current_stage` y las salidas registradas.
    pub fn validate_invariants(&self) -> bool {
        if !self.stage_outputs.validate_order() {
            return false;
        }
        self.current_stage == self.stage_outputs.next_stage()
    }
}
