// [libs/infra/db/src/repositories/collaboration.rs]
/*!
 * APARATO: COLLABORATION REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE CONCESIONES DE COLABORADOR E INVITACIONES
 */

use libsql::{params, Connection};
use tracing::instrument;

use reelforge_domain_models::{
    CollaboratorGrant, Invitation, InvitationId, InvitationStatus, ProductionId, Role, TenantId,
};

use crate::errors::DbError;
use crate::repositories::tenant::parse_rfc3339;

pub struct CollaborationRepository {
    connection: Connection,
}

impl CollaborationRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self))]
    pub async fn list_grants(&self, production_id: ProductionId) -> Result<Vec<CollaboratorGrant>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT production_id, tenant_id, role FROM collaborator_grants WHERE production_id = ?1",
                params![production_id.to_string()],
            )
            .await?;

        let mut grants = Vec::new();
        while let Some(row) = rows.next().await? {
            grants.push(map_row_to_grant(&row)?);
        }
        Ok(grants)
    }

    /// Creación atómica de un grant, usada exclusivamente por
    /// `accept_invitation` (§4.5): falla con `Conflict` si ya existe un
    /// grant para `(production, tenant)`.
    #[instrument(skip(self, grant))]
    pub async fn create_grant(&self, grant: &CollaboratorGrant) -> Result<(), DbError> {
        let result = self
            .connection
            .execute(
                "INSERT INTO collaborator_grants (production_id, tenant_id, role) VALUES (?1, ?2, ?3)",
                params![
                    grant.production_id.to_string(),
                    grant.tenant_id.to_string(),
                    role_to_str(grant.role).to_string(),
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE") || e.to_string().contains("PRIMARY KEY") => {
                Err(DbError::Conflict)
            }
            Err(e) => Err(DbError::QueryError(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_grant(&self, production_id: ProductionId, tenant_id: TenantId) -> Result<(), DbError> {
        let rows_affected = self
            .connection
            .execute(
                "DELETE FROM collaborator_grants WHERE production_id = ?1 AND tenant_id = ?2",
                params![production_id.to_string(), tenant_id.to_string()],
            )
            .await?;
        if rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(role))]
    pub async fn change_grant_role(
        &self,
        production_id: ProductionId,
        tenant_id: TenantId,
        role: Role,
    ) -> Result<(), DbError> {
        let rows_affected = self
            .connection
            .execute(
                "UPDATE collaborator_grants SET role = ?1 WHERE production_id = ?2 AND tenant_id = ?3",
                params![role_to_str(role).to_string(), production_id.to_string(), tenant_id.to_string()],
            )
            .await?;
        if rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, invitation))]
    pub async fn create_invitation(&self, invitation: &Invitation) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO invitations
                 (id, production_id, inviter_id, invitee_email, role, status, created_at,
                  expires_at, responded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    invitation.id.to_string(),
                    invitation.production_id.to_string(),
                    invitation.inviter_id.to_string(),
                    invitation.invitee_email.clone(),
                    role_to_str(invitation.role).to_string(),
                    status_to_str(invitation.status).to_string(),
                    invitation.created_at.to_rfc3339(),
                    invitation.expires_at.to_rfc3339(),
                    invitation.responded_at.map(|t| t.to_rfc3339()),
                ],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn load_invitation(&self, id: InvitationId) -> Result<Invitation, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, production_id, inviter_id, invitee_email, role, status, created_at,
                        expires_at, responded_at
                 FROM invitations WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DbError::NotFound)?;
        map_row_to_invitation(&row)
    }

    /// Verifica que no exista ya una invitación pendiente hacia el mismo
    /// correo para la misma producción, per la invariante de §4.5's
    /// "invite_collaborator" original.
    #[instrument(skip(self))]
    pub async fn has_pending_invitation(&self, production_id: ProductionId, email: &str) -> Result<bool, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT COUNT(*) FROM invitations
                 WHERE production_id = ?1 AND lower(invitee_email) = lower(?2) AND status = 'pending'",
                params![production_id.to_string(), email.to_string()],
            )
            .await?;
        let count: i64 = rows.next().await?.ok_or(DbError::NotFound)?.get(0)?;
        Ok(count > 0)
    }

    #[instrument(skip(self, invitation))]
    pub async fn update_invitation(&self, invitation: &Invitation) -> Result<(), DbError> {
        let rows_affected = self
            .connection
            .execute(
                "UPDATE invitations SET status = ?1, responded_at = ?2 WHERE id = ?3",
                params![
                    status_to_str(invitation.status).to_string(),
                    invitation.responded_at.map(|t| t.to_rfc3339()),
                    invitation.id.to_string(),
                ],
            )
            .await?;
        if rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Barrido usado por el reaper: todas las invitaciones `pending` cuyo
    /// `expires_at` ya pasó.
    #[instrument(skip(self))]
    pub async fn list_stale_pending_invitations(&self, now_rfc3339: &str) -> Result<Vec<Invitation>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, production_id, inviter_id, invitee_email, role, status, created_at,
                        expires_at, responded_at
                 FROM invitations WHERE status = 'pending' AND expires_at <= ?1",
                params![now_rfc3339.to_string()],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row_to_invitation(&row)?);
        }
        Ok(out)
    }
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::Viewer => "viewer",
        Role::Editor => "editor",
        Role::Admin => "admin",
    }
}

fn role_from_str(value: &str) -> Result<Role, DbError> {
    match value {
        "viewer" => Ok(Role::Viewer),
        "editor" => Ok(Role::Editor),
        "admin" => Ok(Role::Admin),
        other => Err(DbError::MappingError(format!("unknown role '{other}'"))),
    }
}

fn status_to_str(status: InvitationStatus) -> &'static str {
    match status {
        InvitationStatus::Pending => "pending",
        InvitationStatus::Accepted => "accepted",
        InvitationStatus::Rejected => "rejected",
        InvitationStatus::Expired => "expired",
    }
}

fn status_from_str(value: &str) -> Result<InvitationStatus, DbError> {
    match value {
        "pending" => Ok(InvitationStatus::Pending),
        "accepted" => Ok(InvitationStatus::Accepted),
        "rejected" => Ok(InvitationStatus::Rejected),
        "expired" => Ok(InvitationStatus::Expired),
        other => Err(DbError::MappingError(format!("unknown invitation status '{other}'"))),
    }
}

fn map_row_to_grant(row: &libsql::Row) -> Result<CollaboratorGrant, DbError> {
    let production_id: String = row.get(0)?;
    let tenant_id: String = row.get(1)?;
    let role: String = row.get(2)?;
    Ok(CollaboratorGrant {
        production_id: ProductionId(production_id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        tenant_id: TenantId(tenant_id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        role: role_from_str(&role)?,
    })
}

fn map_row_to_invitation(row: &libsql::Row) -> Result<Invitation, DbError> {
    let id: String = row.get(0)?;
    let production_id: String = row.get(1)?;
    let inviter_id: String = row.get(2)?;
    let invitee_email: String = row.get(3)?;
    let role: String = row.get(4)?;
    let status: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let expires_at: String = row.get(7)?;
    let responded_at: Option<String> = row.get(8)?;

    Ok(Invitation {
        id: InvitationId(id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        production_id: ProductionId(production_id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        inviter_id: TenantId(inviter_id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        invitee_email,
        role: role_from_str(&role)?,
        status: status_from_str(&status)?,
        created_at: parse_rfc3339(&created_at)?,
        expires_at: parse_rfc3339(&expires_at)?,
        responded_at: responded_at.map(|s| parse_rfc3339(&s)).transpose()?,
    })
}
