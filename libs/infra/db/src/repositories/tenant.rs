// [libs/infra/db/src/repositories/tenant.rs]
/*!
 * APARATO: TENANT REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE CUENTAS DE OPERADOR Y SU CUOTA
 */

use chrono::{DateTime, Utc};
use libsql::{params, Connection};
use tracing::instrument;

use reelforge_domain_models::{SubscriptionTier, TenantAccount, TenantId};

use crate::errors::DbError;

pub struct TenantRepository {
    connection: Connection,
}

impl TenantRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, tenant))]
    pub async fn create(&self, tenant: &TenantAccount) -> Result<(), DbError> {
        let rows = self
            .connection
            .execute(
                "INSERT INTO tenants (id, email, password_digest, tier, quota_minutes_remaining, display_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    tenant.id.to_string(),
                    tenant.email.clone(),
                    tenant.password_digest.clone(),
                    tier_to_str(tenant.tier).to_string(),
                    tenant.quota_minutes_remaining,
                    tenant.display_name.clone(),
                    tenant.created_at.to_rfc3339(),
                ],
            )
            .await;

        match rows {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE") => Err(DbError::Conflict),
            Err(e) => Err(DbError::QueryError(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&self, id: TenantId) -> Result<TenantAccount, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, email, password_digest, tier, quota_minutes_remaining, display_name, created_at
                 FROM tenants WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        let row = rows.next().await?.ok_or(DbError::NotFound)?;
        map_row_to_tenant(&row)
    }

    #[instrument(skip(self))]
    pub async fn load_by_email(&self, email: &str) -> Result<TenantAccount, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, email, password_digest, tier, quota_minutes_remaining, display_name, created_at
                 FROM tenants WHERE email = ?1",
                params![email.to_string()],
            )
            .await?;

        let row = rows.next().await?.ok_or(DbError::NotFound)?;
        map_row_to_tenant(&row)
    }

    /// Actualiza `quota_minutes_remaining` incondicionalmente. El llamador
    /// (Workflow Engine) ya sostiene el lock por tenant de §5 antes de invocar
    /// esto, así que no se requiere CAS adicional aquí.
    #[instrument(skip(self))]
    pub async fn update_quota(&self, id: TenantId, new_quota_minutes: f64) -> Result<(), DbError> {
        let rows_affected = self
            .connection
            .execute(
                "UPDATE tenants SET quota_minutes_remaining = ?1 WHERE id = ?2",
                params![new_quota_minutes, id.to_string()],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

fn tier_to_str(tier: SubscriptionTier) -> &'static str {
    match tier {
        SubscriptionTier::Free => "free",
        SubscriptionTier::PayPerUse => "pay_per_use",
        SubscriptionTier::Professional => "professional",
        SubscriptionTier::Enterprise => "enterprise",
    }
}

fn tier_from_str(value: &str) -> Result<SubscriptionTier, DbError> {
    match value {
        "free" => Ok(SubscriptionTier::Free),
        "pay_per_use" => Ok(SubscriptionTier::PayPerUse),
        "professional" => Ok(SubscriptionTier::Professional),
        "enterprise" => Ok(SubscriptionTier::Enterprise),
        other => Err(DbError::MappingError(format!("unknown tier '{other}'"))),
    }
}

fn map_row_to_tenant(row: &libsql::Row) -> Result<TenantAccount, DbError> {
    let id: String = row.get(0)?;
    let email: String = row.get(1)?;
    let password_digest: String = row.get(2)?;
    let tier: String = row.get(3)?;
    let quota_minutes_remaining: f64 = row.get(4)?;
    let display_name: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(TenantAccount {
        id: TenantId(id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        email,
        password_digest,
        tier: tier_from_str(&tier)?,
        quota_minutes_remaining,
        display_name,
        created_at: parse_rfc3339(&created_at)?,
    })
}

pub(crate) fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::MappingError(format!("{e}")))
}
