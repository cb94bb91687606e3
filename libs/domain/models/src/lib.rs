// [libs/domain/models/src/lib.rs]
//! Contratos soberanos de dominio compartidos por todo el workspace:
//! Producción, Cuenta de Operador, Colaboración y topología de etapas.
//! Este crate no depende de ningún otro crate interno — es la base de la
//! pirámide de dependencias.

pub mod collaboration;
pub mod errors;
pub mod ids;
pub mod production;
pub mod stage;
pub mod tenant;

pub use collaboration::{CollaboratorGrant, Invitation, InvitationStatus, Role, INVITATION_EXPIRY};
pub use errors::ModelError;
pub use ids::{InvitationId, ProductionId, TenantId};
pub use production::{
    ArtifactRef, AspectRatio, CharacterFeatureModel, CharacterModelOutput, ErrorKind, LastError,
    LipSyncKeyframe, LipSyncOutput, Production, ProductionConfig, ProductionStatus, RenderFormat,
    RenderOutput, RenderQuality, SceneDescriptor, ScriptParseOutput, SoundMatchOutput,
    SoundPlacement, StageOutputs, StoryboardFrame, StoryboardOutput,
};
pub use stage::{CurrentStage, StageId, ALL_STAGES, TOTAL_STAGE_WEIGHT};
pub use tenant::{SubscriptionTier, TenantAccount};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn new_production_starts_at_script_parse_with_version_zero() {
        let config =
            ProductionConfig::new(AspectRatio::Nine16, RenderQuality::P1080, RenderFormat::Mp4, 2.0)
                .unwrap();
        let prod = Production::new(
            TenantId::new(),
            "INT. KITCHEN - DAY".to_string(),
            vec![],
            None,
            config,
            Utc::now(),
        );
        assert_eq!(prod.current_stage, CurrentStage::Stage(StageId::ScriptParse));
        assert_eq!(prod.version, 0);
        assert!(prod.validate_invariants());
    }

    #[test]
    fn target_minutes_out_of_range_is_rejected() {
        let err =
            ProductionConfig::new(AspectRatio::Nine16, RenderQuality::P720, RenderFormat::Mp4, 0.1)
                .unwrap_err();
        assert_eq!(err, ModelError::TargetMinutesOutOfRange(0.1));

        let err =
            ProductionConfig::new(AspectRatio::Nine16, RenderQuality::P720, RenderFormat::Mp4, 11.0)
                .unwrap_err();
        assert_eq!(err, ModelError::TargetMinutesOutOfRange(11.0));
    }

    #[test]
    fn stage_outputs_next_stage_follows_fixed_order() {
        let mut outputs = StageOutputs::default();
        assert_eq!(outputs.next_stage(), CurrentStage::Stage(StageId::ScriptParse));

        outputs.script_parse = Some(ScriptParseOutput { scenes: vec![] });
        assert_eq!(outputs.next_stage(), CurrentStage::Stage(StageId::CharacterModel));
        assert!(outputs.validate_order());
    }

    #[test]
    fn stage_outputs_with_gap_violates_order_invariant() {
        let mut outputs = StageOutputs::default();
        outputs.storyboard = Some(StoryboardOutput { frames: vec![] });
        assert!(!outputs.validate_order());
    }

    #[test]
    fn invitation_rejects_empty_email() {
        let err = Invitation::new(
            ProductionId::new(),
            TenantId::new(),
            "   ".to_string(),
            Role::Editor,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, ModelError::EmptyInvitationEmail);
    }

    #[test]
    fn invitation_email_match_is_case_insensitive() {
        let inv = Invitation::new(
            ProductionId::new(),
            TenantId::new(),
            "Someone@Example.com".to_string(),
            Role::Viewer,
            Utc::now(),
        )
        .unwrap();
        assert!(inv.email_matches("someone@example.com"));
        assert!(!inv.email_matches("other@example.com"));
    }

    #[test]
    fn invitation_expires_seven_days_after_creation() {
        let now = Utc::now();
        let inv = Invitation::new(
            ProductionId::new(),
            TenantId::new(),
            "person@example.com".to_string(),
            Role::Viewer,
            now,
        )
        .unwrap();
        assert!(!inv.is_expired(now));
        assert!(inv.is_expired(now + INVITATION_EXPIRY));
    }
}
