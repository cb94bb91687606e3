// [libs/domain/policy/src/lib.rs]
/*!
 * =================================================================
 * APARATO: POLICY GATE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: RESOLUCIÓN DE ROL EFECTIVO Y CAPACIDADES
 *
 * Resolución pura: `(TenantAccount, Production, Vec<CollaboratorGrant>)
 * -> EffectiveRole`, y de ahí a un conjunto de capacidades por operación.
 * No toca I/O; el llamador (Workflow Engine, handlers HTTP) ya cargó las
 * entidades desde los stores correspondientes.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use reelforge_domain_models::{CollaboratorGrant, Production, Role, TenantId};

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveRole {
    Owner,
    Admin,
    Editor,
    Viewer,
    None,
}

/// Operaciones cuya admisibilidad depende del rol efectivo, per la tabla
/// de §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    AdvanceStage,
    PauseResume,
    InviteCollaborator,
    ManageCollaborators,
    DeleteProduction,
    TriggerExport,
}

/// Resuelve el rol efectivo de `tenant_id` sobre `production`, dados los
/// grants de colaboración vigentes. El propietario siempre resuelve a
/// `Owner` sin necesidad de un grant explícito.
pub fn resolve_role(
    tenant_id: TenantId,
    production: &Production,
    grants: &[CollaboratorGrant],
) -> EffectiveRole {
    if production.tenant_id == tenant_id {
        return EffectiveRole::Owner;
    }
    match grants
        .iter()
        .find(|g| g.production_id == production.id && g.tenant_id == tenant_id)
        .map(|g| g.role)
    {
        Some(Role::Admin) => EffectiveRole::Admin,
        Some(Role::Editor) => EffectiveRole::Editor,
        Some(Role::Viewer) => EffectiveRole::Viewer,
        None => EffectiveRole::None,
    }
}

/// Tabla de capacidades exacta de §4.5: filas = operación, columnas = rol.
pub fn is_permitted(role: EffectiveRole, operation: Operation) -> bool {
    use EffectiveRole::*;
    use Operation::*;
    match operation {
        Read => !matches!(role, None),
        AdvanceStage | PauseResume => matches!(role, Owner | Admin | Editor),
        InviteCollaborator | ManageCollaborators => matches!(role, Owner | Admin),
        DeleteProduction => matches!(role, Owner),
        TriggerExport => matches!(role, Owner | Admin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelforge_domain_models::{AspectRatio, ProductionConfig, RenderFormat, RenderQuality};

    fn sample_production(owner: TenantId) -> Production {
        let config =
            ProductionConfig::new(AspectRatio::Nine16, RenderQuality::P1080, RenderFormat::Mp4, 2.0)
                .unwrap();
        Production::new(owner, "script".into(), vec![], None, config, Utc::now())
    }

    #[test]
    fn owner_always_resolves_to_owner_role() {
        let owner = TenantId::new();
        let production = sample_production(owner);
        let role = resolve_role(owner, &production, &[]);
        assert_eq!(role, EffectiveRole::Owner);
        assert!(is_permitted(role, Operation::DeleteProduction));
    }

    #[test]
    fn viewer_cannot_advance_stage_or_delete() {
        let owner = TenantId::new();
        let viewer_id = TenantId::new();
        let production = sample_production(owner);
        let grants = vec![CollaboratorGrant {
            production_id: production.id,
            tenant_id: viewer_id,
            role: Role::Viewer,
        }];
        let role = resolve_role(viewer_id, &production, &grants);
        assert_eq!(role, EffectiveRole::Viewer);
        assert!(is_permitted(role, Operation::Read));
        assert!(!is_permitted(role, Operation::AdvanceStage));
        assert!(!is_permitted(role, Operation::DeleteProduction));
    }

    #[test]
    fn stranger_with_no_grant_has_no_access() {
        let owner = TenantId::new();
        let stranger = TenantId::new();
        let production = sample_production(owner);
        let role = resolve_role(stranger, &production, &[]);
        assert_eq!(role, EffectiveRole::None);
        assert!(!is_permitted(role, Operation::Read));
    }

    #[test]
    fn admin_can_manage_collaborators_but_not_delete() {
        let owner = TenantId::new();
        let admin_id = TenantId::new();
        let production = sample_production(owner);
        let grants = vec![CollaboratorGrant {
            production_id: production.id,
            tenant_id: admin_id,
            role: Role::Admin,
        }];
        let role = resolve_role(admin_id, &production, &grants);
        assert_eq!(role, EffectiveRole::Admin);
        assert!(is_permitted(role, Operation::ManageCollaborators));
        assert!(is_permitted(role, Operation::TriggerExport));
        assert!(!is_permitted(role, Operation::DeleteProduction));
    }

    #[test]
    fn editor_can_advance_but_not_invite() {
        let owner = TenantId::new();
        let editor_id = TenantId::new();
        let production = sample_production(owner);
        let grants = vec![CollaboratorGrant {
            production_id: production.id,
            tenant_id: editor_id,
            role: Role::Editor,
        }];
        let role = resolve_role(editor_id, &production, &grants);
        assert_eq!(role, EffectiveRole::Editor);
        assert!(is_permitted(role, Operation::AdvanceStage));
        assert!(!is_permitted(role, Operation::InviteCollaborator));
        assert!(!is_permitted(role, Operation::TriggerExport));
    }
}
