// [apps/orchestrator/src/handlers/collaboration.rs]
/*!
 * APARATO: COLLABORATION HANDLERS
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: INVITACIONES Y CONCESIONES DE COLABORADOR (§4.5)
 */

use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use reelforge_domain_models::{CollaboratorGrant, Invitation, InvitationId, InvitationStatus, ProductionId, Role};
use reelforge_domain_policy::{is_permitted, resolve_role, Operation};

use crate::handlers::ApiError;
use crate::middleware::TenantIdentity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InviteCollaboratorRequest {
    pub invitee_email: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// `POST production/{id}/invitations` — exige que no exista ya una invitación
/// `pending` hacia el mismo correo para la misma producción (§4.5).
#[instrument(skip(state, body), fields(tenant = %identity.tenant_id))]
pub async fn invite_collaborator(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(production_id): Path<ProductionId>,
    Json(body): Json<InviteCollaboratorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let production = state.workflow_engine.load_production(production_id).await?;
    let grants = state.collaboration_repository.list_grants(production_id).await?;
    let role = resolve_role(identity.tenant_id, &production, &grants);
    if !is_permitted(role, Operation::InviteCollaborator) {
        return Err(ApiError::forbidden());
    }

    if state.collaboration_repository.has_pending_invitation(production_id, &body.invitee_email).await? {
        return Err(ApiError::invalid_input("a pending invitation already exists for this email"));
    }

    let invitation = Invitation::new(production_id, identity.tenant_id, body.invitee_email, body.role, Utc::now())
        .map_err(ApiError::invalid_input)?;
    state.collaboration_repository.create_invitation(&invitation).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// `POST invitations/{id}/accept` — el correo del aceptante debe coincidir
/// sin distinguir mayúsculas (§9) y no debe existir ya un grant para el par
/// `(production, tenant)`. Acepta atómicamente la invitación y crea el grant.
#[instrument(skip(state, body), fields(tenant = %identity.tenant_id))]
pub async fn accept_invitation(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(invitation_id): Path<InvitationId>,
    Json(body): Json<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut invitation = state.collaboration_repository.load_invitation(invitation_id).await?;

    if invitation.status != InvitationStatus::Pending {
        return Err(ApiError::invalid_input("invitation is no longer pending"));
    }
    if invitation.is_expired(Utc::now()) {
        invitation.status = InvitationStatus::Expired;
        invitation.responded_at = Some(Utc::now());
        state.collaboration_repository.update_invitation(&invitation).await?;
        return Err(ApiError::invalid_input("invitation has expired"));
    }
    if !invitation.email_matches(&body.acceptor_email) {
        return Err(ApiError::forbidden());
    }

    let grant = CollaboratorGrant { production_id: invitation.production_id, tenant_id: identity.tenant_id, role: invitation.role };
    state.collaboration_repository.create_grant(&grant).await?;

    invitation.status = InvitationStatus::Accepted;
    invitation.responded_at = Some(Utc::now());
    state.collaboration_repository.update_invitation(&invitation).await?;

    Ok(Json(invitation))
}

#[derive(Debug, Deserialize)]
pub struct AcceptInvitationRequest {
    pub acceptor_email: String,
}

/// `GET production/{id}/collaborators`.
#[instrument(skip(state), fields(tenant = %identity.tenant_id))]
pub async fn list_collaborators(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(production_id): Path<ProductionId>,
) -> Result<impl IntoResponse, ApiError> {
    let production = state.workflow_engine.load_production(production_id).await?;
    let grants = state.collaboration_repository.list_grants(production_id).await?;
    let role = resolve_role(identity.tenant_id, &production, &grants);
    if !is_permitted(role, Operation::Read) {
        return Err(ApiError::forbidden());
    }
    Ok(Json(grants))
}

/// `POST production/{id}/collaborators/{tenant_id}/role`.
#[instrument(skip(state, body), fields(tenant = %identity.tenant_id))]
pub async fn change_collaborator_role(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path((production_id, target_tenant_id)): Path<(ProductionId, reelforge_domain_models::TenantId)>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let production = state.workflow_engine.load_production(production_id).await?;
    let grants = state.collaboration_repository.list_grants(production_id).await?;
    let role = resolve_role(identity.tenant_id, &production, &grants);
    if !is_permitted(role, Operation::ManageCollaborators) {
        return Err(ApiError::forbidden());
    }
    state.collaboration_repository.change_grant_role(production_id, target_tenant_id, body.role).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE production/{id}/collaborators/{tenant_id}`.
#[instrument(skip(state), fields(tenant = %identity.tenant_id))]
pub async fn remove_collaborator(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path((production_id, target_tenant_id)): Path<(ProductionId, reelforge_domain_models::TenantId)>,
) -> Result<impl IntoResponse, ApiError> {
    let production = state.workflow_engine.load_production(production_id).await?;
    let grants = state.collaboration_repository.list_grants(production_id).await?;
    let role = resolve_role(identity.tenant_id, &production, &grants);
    if !is_permitted(role, Operation::ManageCollaborators) {
        return Err(ApiError::forbidden());
    }
    state.collaboration_repository.remove_grant(production_id, target_tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
