// [apps/orchestrator/src/bin/seed.rs]
//! =================================================================
//! APARATO: GENESIS FORGE SEEDER (V1.0 - GOLD MASTER)
//! CLASIFICACIÓN: INFRASTRUCTURE UTILITY (ESTRATO L3)
//! RESPONSABILIDAD: SEMBRADO ATÓMICO DE UN TENANT Y UNA PRODUCCIÓN DE PRUEBA
//! =================================================================

use dotenvy::dotenv;
use libsql::params;
use tracing::{error, info};
use uuid::Uuid;

use reelforge_infra_db::TursoClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info,reelforge_infra_db=debug").with_target(false).init();

    info!("💠 [GENESIS_FORGE]: initiating sovereign infrastructure hydration");

    let database_url =
        std::env::var("REELFORGE_DB_DSN").expect("CRITICAL_FAULT: REELFORGE_DB_DSN is missing in environment");
    let database_token = std::env::var("REELFORGE_DB_AUTH_TOKEN").ok();

    let database_client = match TursoClient::connect(&database_url, database_token).await {
        Ok(client) => client,
        Err(e) => {
            error!("❌ [FORGE_FAULT]: UPLINK_COLLAPSE: {}", e);
            return Err(anyhow::anyhow!(e));
        }
    };

    let database_connection = database_client.get_connection().map_err(|e| anyhow::anyhow!("POOL_FAULT: {}", e))?;

    info!("⚙️  [FORGE]: planting a sample tenant account...");
    let tenant_id = Uuid::new_v4().to_string();
    database_connection
        .execute(
            "INSERT INTO tenants (id, email, password_digest, tier, quota_minutes_remaining, display_name)
             VALUES (?1, ?2, ?3, 'professional', 50.0, ?4)
             ON CONFLICT(email) DO NOTHING",
            params![tenant_id.clone(), "forge-seed@reelforge.dev", "unused-in-seed-context", "Genesis Forge Tenant"],
        )
        .await?;

    info!("🎬 [FORGE]: planting a sample production shell...");
    let production_id = Uuid::new_v4().to_string();
    database_connection
        .execute(
            "INSERT INTO productions
             (id, tenant_id, script, character_refs_json, narration_ref, config_json,
              status, current_stage_json, stage_outputs_json, version)
             VALUES (?1, ?2, ?3, '[]', NULL, ?4, 'created', ?5, '{}', 0)
             ON CONFLICT(id) DO NOTHING",
            params![
                production_id,
                tenant_id,
                "INT. ROOFTOP - NIGHT. A courier discovers the city's last working elevator.",
                r#"{"aspect":"nine16","quality":"p1080","format":"mp4","target_minutes":2.0}"#,
                r#"{"Stage":"ScriptParse"}"#,
            ],
        )
        .await?;

    info!("✅ [GENESIS_COMPLETE]: strata synchronized, node ready for dispatch");
    Ok(())
}
