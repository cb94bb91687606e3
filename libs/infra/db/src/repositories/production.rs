// [libs/infra/db/src/repositories/production.rs]
/*!
 * APARATO: PRODUCTION REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA CON CONCURRENCIA OPTIMISTA DE `Production`
 *
 * El `update` implementa compare-and-swap sobre `version` (§4.4): la
 * sentencia incluye `WHERE version = ?`, y cero filas afectadas se traduce
 * en `DbError::VersionConflict` — el mismo patrón transaccional que el
 * repositorio de misiones del orquestador original, adaptado de una
 * reclamación de propiedad a un CAS de versión.
 */

use libsql::{params, Connection};
use tracing::instrument;

use reelforge_domain_models::{ArtifactRef, CurrentStage, Production, ProductionId, TenantId};

use crate::errors::DbError;
use crate::repositories::tenant::parse_rfc3339;

pub struct ProductionRepository {
    connection: Connection,
}

#[derive(Debug, Clone, Default)]
pub struct ProductionFilter {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub offset: u32,
    pub limit: u32,
}

impl ProductionRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, production))]
    pub async fn create(&self, production: &Production) -> Result<(), DbError> {
        let row = to_row(production)?;
        let result = self
            .connection
            .execute(
                "INSERT INTO productions
                 (id, tenant_id, script, character_refs_json, narration_ref, config_json,
                  status, current_stage_json, stage_outputs_json, version, created_at,
                  updated_at, last_error_json, render_cost_debited)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    row.id,
                    row.tenant_id,
                    row.script,
                    row.character_refs_json,
                    row.narration_ref,
                    row.config_json,
                    row.status,
                    row.current_stage_json,
                    row.stage_outputs_json,
                    row.version,
                    row.created_at,
                    row.updated_at,
                    row.last_error_json,
                    row.render_cost_debited,
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE") => Err(DbError::Conflict),
            Err(e) => Err(DbError::QueryError(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&self, id: ProductionId) -> Result<Production, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, tenant_id, script, character_refs_json, narration_ref, config_json,
                        status, current_stage_json, stage_outputs_json, version, created_at,
                        updated_at, last_error_json, render_cost_debited
                 FROM productions WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        let row = rows.next().await?.ok_or(DbError::NotFound)?;
        from_row(&row)
    }

    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        tenant_id: TenantId,
        filter: &ProductionFilter,
        paging: Paging,
    ) -> Result<(Vec<Production>, u64), DbError> {
        let (query, count_query) = match &filter.status {
            Some(_) => (
                "SELECT id, tenant_id, script, character_refs_json, narration_ref, config_json,
                        status, current_stage_json, stage_outputs_json, version, created_at,
                        updated_at, last_error_json, render_cost_debited
                 FROM productions WHERE tenant_id = ?1 AND status = ?2
                 ORDER BY created_at DESC LIMIT ?3 OFFSET ?4",
                "SELECT COUNT(*) FROM productions WHERE tenant_id = ?1 AND status = ?2",
            ),
            None => (
                "SELECT id, tenant_id, script, character_refs_json, narration_ref, config_json,
                        status, current_stage_json, stage_outputs_json, version, created_at,
                        updated_at, last_error_json, render_cost_debited
                 FROM productions WHERE tenant_id = ?1
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                "SELECT COUNT(*) FROM productions WHERE tenant_id = ?1",
            ),
        };

        let mut items = Vec::new();
        if let Some(status) = &filter.status {
            let mut rows = self
                .connection
                .query(query, params![tenant_id.to_string(), status.clone(), paging.limit, paging.offset])
                .await?;
            while let Some(row) = rows.next().await? {
                items.push(from_row(&row)?);
            }
            let mut count_rows = self
                .connection
                .query(count_query, params![tenant_id.to_string(), status.clone()])
                .await?;
            let total: u64 = count_rows.next().await?.ok_or(DbError::NotFound)?.get(0)?;
            return Ok((items, total));
        }

        let mut rows = self
            .connection
            .query(query, params![tenant_id.to_string(), paging.limit, paging.offset])
            .await?;
        while let Some(row) = rows.next().await? {
            items.push(from_row(&row)?);
        }
        let mut count_rows = self
            .connection
            .query(count_query, params![tenant_id.to_string()])
            .await?;
        let total: u64 = count_rows.next().await?.ok_or(DbError::NotFound)?.get(0)?;
        Ok((items, total))
    }

    /// CAS sobre `version`: el llamador debe pasar la `Production` con el
    /// `version` que cree vigente; si coincide, la fila se actualiza y la
    /// nueva versión se incrementa, junto con `updated_at`.
    #[instrument(skip(self, production))]
    pub async fn update(&self, production: &Production) -> Result<(), DbError> {
        let row = to_row(production)?;
        let rows_affected = self
            .connection
            .execute(
                "UPDATE productions SET
                    script = ?1, character_refs_json = ?2, narration_ref = ?3,
                    config_json = ?4, status = ?5, current_stage_json = ?6,
                    stage_outputs_json = ?7, version = version + 1, updated_at = ?8,
                    last_error_json = ?9, render_cost_debited = ?10
                 WHERE id = ?11 AND version = ?12",
                params![
                    row.script,
                    row.character_refs_json,
                    row.narration_ref,
                    row.config_json,
                    row.status,
                    row.current_stage_json,
                    row.stage_outputs_json,
                    row.updated_at,
                    row.last_error_json,
                    row.render_cost_debited,
                    row.id,
                    row.version,
                ],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::VersionConflict);
        }
        Ok(())
    }

    /// Elimina la producción y sus dependientes directos (invitaciones y
    /// concesiones de colaborador) en una transacción, per §4.4.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductionId) -> Result<(), DbError> {
        let tx = self.connection.transaction().await.map_err(|_| DbError::TransactionError)?;

        tx.execute("DELETE FROM invitations WHERE production_id = ?1", params![id.to_string()])
            .await?;
        tx.execute(
            "DELETE FROM collaborator_grants WHERE production_id = ?1",
            params![id.to_string()],
        )
        .await?;
        let rows_affected = tx
            .execute("DELETE FROM productions WHERE id = ?1", params![id.to_string()])
            .await?;

        if rows_affected == 0 {
            return Err(DbError::NotFound);
        }

        tx.commit().await.map_err(|_| DbError::TransactionError)?;
        Ok(())
    }
}

struct ProductionRow {
    id: String,
    tenant_id: String,
    script: String,
    character_refs_json: String,
    narration_ref: Option<String>,
    config_json: String,
    status: String,
    current_stage_json: String,
    stage_outputs_json: String,
    version: u64,
    created_at: String,
    updated_at: String,
    last_error_json: Option<String>,
    render_cost_debited: Option<f64>,
}

fn to_row(production: &Production) -> Result<ProductionRow, DbError> {
    Ok(ProductionRow {
        id: production.id.to_string(),
        tenant_id: production.tenant_id.to_string(),
        script: production.script.clone(),
        character_refs_json: serde_json::to_string(&production.character_refs)
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        narration_ref: production.narration_ref.as_ref().map(|r| r.as_str().to_string()),
        config_json: serde_json::to_string(&production.config).map_err(|e| DbError::MappingError(e.to_string()))?,
        status: serde_json::to_value(production.status)
            .map_err(|e| DbError::MappingError(e.to_string()))?
            .as_str()
            .unwrap_or_default()
            .to_string(),
        current_stage_json: serde_json::to_string(&production.current_stage)
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        stage_outputs_json: serde_json::to_string(&production.stage_outputs)
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        version: production.version,
        created_at: production.created_at.to_rfc3339(),
        updated_at: production.updated_at.to_rfc3339(),
        last_error_json: production
            .last_error
            .as_ref()
            .map(|e| serde_json::to_string(e))
            .transpose()
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        render_cost_debited: production.render_cost_debited,
    })
}

fn from_row(row: &libsql::Row) -> Result<Production, DbError> {
    let id: String = row.get(0)?;
    let tenant_id: String = row.get(1)?;
    let script: String = row.get(2)?;
    let character_refs_json: String = row.get(3)?;
    let narration_ref: Option<String> = row.get(4)?;
    let config_json: String = row.get(5)?;
    let status: String = row.get(6)?;
    let current_stage_json: String = row.get(7)?;
    let stage_outputs_json: String = row.get(8)?;
    let version: u64 = row.get(9)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;
    let last_error_json: Option<String> = row.get(12)?;
    let render_cost_debited: Option<f64> = row.get(13)?;

    let character_refs: Vec<ArtifactRef> =
        serde_json::from_str(&character_refs_json).map_err(|e| DbError::MappingError(e.to_string()))?;
    let status_json = serde_json::Value::String(status);

    Ok(Production {
        id: ProductionId(id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        tenant_id: TenantId(tenant_id.parse().map_err(|e| DbError::MappingError(format!("{e}")))?),
        script,
        character_refs,
        narration_ref: narration_ref.map(ArtifactRef::new),
        config: serde_json::from_str(&config_json).map_err(|e| DbError::MappingError(e.to_string()))?,
        status: serde_json::from_value(status_json).map_err(|e| DbError::MappingError(e.to_string()))?,
        current_stage: serde_json::from_str::<CurrentStage>(&current_stage_json)
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        stage_outputs: serde_json::from_str(&stage_outputs_json).map_err(|e| DbError::MappingError(e.to_string()))?,
        version,
        created_at: parse_rfc3339(&created_at)?,
        updated_at: parse_rfc3339(&updated_at)?,
        last_error: last_error_json
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        render_cost_debited,
    })
}
