// [libs/infra/db/src/repositories/version.rs]
/*!
 * APARATO: PRODUCTION VERSION REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: HISTORIAL DE SNAPSHOTS Y SU PURGA A LOS 30 DÍAS (§9)
 */

use chrono::{DateTime, Utc};
use libsql::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use reelforge_domain_models::Production;

use crate::errors::DbError;

pub struct VersionRepository {
    connection: Connection,
}

impl VersionRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Registra un snapshot JSON de la producción en cada `update()` exitoso
    /// del Production Store (REDESIGN FLAG de §9: historial retenido, no
    /// indefinidamente como en la fuente original, sino 30 días).
    #[instrument(skip(self, production))]
    pub async fn record_snapshot(&self, production: &Production, now: DateTime<Utc>) -> Result<(), DbError> {
        let snapshot_json = serde_json::to_string(production).map_err(|e| DbError::MappingError(e.to_string()))?;
        self.connection
            .execute(
                "INSERT INTO production_versions (id, production_id, snapshot_json, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    production.id.to_string(),
                    snapshot_json,
                    now.to_rfc3339(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Purga snapshots con `created_at` anterior a `cutoff`. Retorna el
    /// número de filas eliminadas para telemetría del reaper.
    #[instrument(skip(self))]
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let rows_affected = self
            .connection
            .execute(
                "DELETE FROM production_versions WHERE created_at < ?1",
                params![cutoff.to_rfc3339()],
            )
            .await?;
        Ok(rows_affected)
    }
}
