// [libs/core/workflow/src/progress.rs]
/*!
 * APARATO: PROGRESS REPORTER
 * CLASIFICACIÓN: CORE LOGIC (ESTRATO L2-CORE)
 * RESPONSABILIDAD: VISTA DE AVANCE DERIVADA, SIN ALMACÉN PROPIO
 *
 * Función pura sobre la `Production` ya cargada — ningún acceso adicional
 * al Production Store (§4.8). Grounded en el patrón de snapshot de solo
 * lectura de `state/mission_control.rs::get_available_buffer_size`.
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use reelforge_domain_models::{CurrentStage, Production, ProductionStatus, RenderQuality, ALL_STAGES, TOTAL_STAGE_WEIGHT};

/// Línea base de duración declarada por calidad de render, usada para
/// proyectar `estimated_remaining_seconds`. Constante de producto, no
/// derivada de ninguna medición en vivo.
pub fn baseline_seconds(quality: RenderQuality) -> f64 {
    match quality {
        RenderQuality::P720 => 300.0,
        RenderQuality::P1080 => 480.0,
        RenderQuality::K4 => 900.0,
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub stages_completed: u32,
    pub progress_fraction: f64,
    pub current_stage: CurrentStage,
    pub status: ProductionStatus,
    pub estimated_remaining_seconds: f64,
}

/// Deriva la vista de avance de una producción. Invariante de
/// monotonicidad (§8 propiedad 2): para una misma producción, lecturas
/// sucesivas no ven `progress_fraction` decrecer salvo transición a
/// `FAILED`/`CANCELLED` — garantizado porque `stage_outputs` solo crece
/// mientras la producción avanza normalmente.
pub fn snapshot(production: &Production) -> ProgressSnapshot {
    let stages_completed = ALL_STAGES.iter().filter(|s| production.stage_outputs.has(**s)).count() as u32;
    let completed_weight: u32 = ALL_STAGES
        .iter()
        .filter(|s| production.stage_outputs.has(**s))
        .map(|s| s.weight())
        .sum();
    let progress_fraction = f64::from(completed_weight) / f64::from(TOTAL_STAGE_WEIGHT);
    let estimated_remaining_seconds = (1.0 - progress_fraction) * baseline_seconds(production.config.quality);

    ProgressSnapshot {
        stages_completed,
        progress_fraction,
        current_stage: production.current_stage,
        status: production.status,
        estimated_remaining_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelforge_domain_models::{
        AspectRatio, CharacterModelOutput, Production, ProductionConfig, RenderFormat, ScriptParseOutput, TenantId,
    };

    fn base_production() -> Production {
        let config =
            ProductionConfig::new(AspectRatio::Nine16, RenderQuality::P1080, RenderFormat::Mp4, 2.0).unwrap();
        Production::new(TenantId::new(), "script".into(), vec![], None, config, Utc::now())
    }

    #[test]
    fn fresh_production_has_zero_progress() {
        let production = base_production();
        let snap = snapshot(&production);
        assert_eq!(snap.stages_completed, 0);
        assert_eq!(snap.progress_fraction, 0.0);
    }

    #[test]
    fn progress_increases_as_stages_complete() {
        let mut production = base_production();
        production.stage_outputs.script_parse = Some(ScriptParseOutput { scenes: vec![] });
        let after_one = snapshot(&production).progress_fraction;
        production.stage_outputs.character_model = Some(CharacterModelOutput { characters: vec![] });
        let after_two = snapshot(&production).progress_fraction;
        assert!(after_two > after_one);
        assert_eq!(after_one, 5.0 / 100.0);
        assert_eq!(after_two, 15.0 / 100.0);
    }

    #[test]
    fn completed_production_reaches_full_progress() {
        let mut production = base_production();
        production.stage_outputs.script_parse = Some(ScriptParseOutput { scenes: vec![] });
        production.stage_outputs.character_model = Some(CharacterModelOutput { characters: vec![] });
        production.stage_outputs.storyboard = Some(reelforge_domain_models::StoryboardOutput { frames: vec![] });
        production.stage_outputs.lip_sync = Some(reelforge_domain_models::LipSyncOutput {
            keyframes_by_character: vec![],
        });
        production.stage_outputs.sound_match = Some(reelforge_domain_models::SoundMatchOutput { placements: vec![] });
        production.stage_outputs.render = Some(reelforge_domain_models::RenderOutput {
            artifact: reelforge_domain_models::ArtifactRef::new("out.mp4"),
            rendered_minutes: 2.0,
        });
        let snap = snapshot(&production);
        assert_eq!(snap.progress_fraction, 1.0);
        assert_eq!(snap.estimated_remaining_seconds, 0.0);
    }
}
