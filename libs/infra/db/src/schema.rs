/**
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * Tres estratos: solidificación (CREATE TABLE IF NOT EXISTS), evolución
 * (ALTER TABLE tolerante a "duplicate column name" para despliegues ya
 * existentes) e índices de aceleración.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

const TACTICAL_TABLES: &[(&str, &str)] = &[
    (
        "TABLE_TENANTS",
        r#"
        CREATE TABLE IF NOT EXISTS tenants (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_digest TEXT NOT NULL,
            tier TEXT NOT NULL,
            quota_minutes_remaining REAL NOT NULL DEFAULT 0,
            display_name TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#,
    ),
    (
        "TABLE_PRODUCTIONS",
        r#"
        CREATE TABLE IF NOT EXISTS productions (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            script TEXT NOT NULL,
            character_refs_json TEXT NOT NULL DEFAULT '[]',
            narration_ref TEXT,
            config_json TEXT NOT NULL,
            status TEXT NOT NULL,
            current_stage_json TEXT NOT NULL,
            stage_outputs_json TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_error_json TEXT,
            render_cost_debited REAL
        );
    "#,
    ),
    (
        "TABLE_COLLABORATOR_GRANTS",
        r#"
        CREATE TABLE IF NOT EXISTS collaborator_grants (
            production_id TEXT NOT NULL,
            tenant_id TEXT NOT NULL,
            role TEXT NOT NULL,
            PRIMARY KEY (production_id, tenant_id)
        );
    "#,
    ),
    (
        "TABLE_INVITATIONS",
        r#"
        CREATE TABLE IF NOT EXISTS invitations (
            id TEXT PRIMARY KEY,
            production_id TEXT NOT NULL,
            inviter_id TEXT NOT NULL,
            invitee_email TEXT NOT NULL,
            role TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at DATETIME NOT NULL,
            responded_at DATETIME
        );
    "#,
    ),
    (
        "TABLE_PRODUCTION_VERSIONS",
        r#"
        CREATE TABLE IF NOT EXISTS production_versions (
            id TEXT PRIMARY KEY,
            production_id TEXT NOT NULL,
            snapshot_json TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#,
    ),
];

const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    (
        "IDX_PRODUCTIONS_TENANT",
        "CREATE INDEX IF NOT EXISTS idx_productions_tenant ON productions(tenant_id);",
    ),
    (
        "IDX_GRANTS_TENANT",
        "CREATE INDEX IF NOT EXISTS idx_grants_tenant ON collaborator_grants(tenant_id);",
    ),
    (
        "IDX_INVITATIONS_PRODUCTION",
        "CREATE INDEX IF NOT EXISTS idx_invitations_production ON invitations(production_id);",
    ),
    (
        "IDX_INVITATIONS_EMAIL",
        "CREATE INDEX IF NOT EXISTS idx_invitations_email ON invitations(invitee_email);",
    ),
    (
        "IDX_INVITATIONS_STATUS_EXPIRY",
        "CREATE INDEX IF NOT EXISTS idx_invitations_status_expiry ON invitations(status, expires_at);",
    ),
    (
        "IDX_VERSIONS_CREATED",
        "CREATE INDEX IF NOT EXISTS idx_versions_created ON production_versions(created_at);",
    ),
];

#[instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization V1.0...");

    solidify_base_strata(database_connection).await?;
    execute_evolutionary_repair(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Production ledger V1.0 level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn execute_evolutionary_repair(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(*sql, ()).await {
            Ok(_) => info!("  🟢 [REPAIR_OK]: Applied evolutionary stratum {}", identifier),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!("  ⚪ [REPAIR_SKIP]: {} already level.", identifier);
                } else {
                    warn!("  ⚠️ [REPAIR_BYPASS]: {} check incomplete: {}", identifier, message);
                }
            }
        }
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}
