// [libs/domain/models/src/collaboration.rs]
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::errors::ModelError;
use crate::ids::{InvitationId, ProductionId, TenantId};

/// Rol otorgado a un colaborador sobre una producción específica. No debe
/// confundirse con el rol de plataforma del operador propietario, que
/// siempre resuelve a capacidades de administrador sobre sus propias
/// producciones (ver Policy Gate, §4.5).
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

/// Concesión de acceso activa y ya aceptada: un colaborador con un rol sobre
/// una producción ajena.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollaboratorGrant {
    pub production_id: ProductionId,
    pub tenant_id: TenantId,
    pub role: Role,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    /// Completa un estado que el sistema original declaraba pero nunca
    /// alcanzaba: ver la barredora de expiración en `reelforge-orchestrator`.
    Expired,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invitation {
    pub id: InvitationId,
    pub production_id: ProductionId,
    pub inviter_id: TenantId,
    pub invitee_email: String,
    pub role: Role,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Ventana de validez por omisión de una invitación pendiente. No está
/// especificada en la fuente original (que nunca expiraba invitaciones);
/// es una decisión de producto de esta implementación.
pub const INVITATION_EXPIRY: Duration = Duration::days(7);

impl Invitation {
    pub fn new(
        production_id: ProductionId,
        inviter_id: TenantId,
        invitee_email: String,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if invitee_email.trim().is_empty() {
            return Err(ModelError::EmptyInvitationEmail);
        }
        Ok(Self {
            id: InvitationId::new(),
            production_id,
            inviter_id,
            invitee_email,
            role,
            status: InvitationStatus::Pending,
            created_at: now,
            expires_at: now + INVITATION_EXPIRY,
            responded_at: None,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && now >= self.expires_at
    }

    /// Coincidencia de correo insensible a mayúsculas, per spec.md §9.
    pub fn email_matches(&self, candidate: &str) -> bool {
        self.invitee_email.eq_ignore_ascii_case(candidate)
    }
}
