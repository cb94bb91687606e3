// [apps/orchestrator/src/bin/migrator.rs]
/*!
 * =================================================================
 * APARATO: DB MIGRATOR CLI (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: OPS INFRASTRUCTURE (ESTRATO L6)
 * RESPONSABILIDAD: EJECUCIÓN MANUAL E IDEMPOTENTE DEL ESQUEMA SOBERANO
 *
 * `TursoClient::connect` ya aplica el esquema al conectar; este binario
 * existe para re-ejecutarlo explícitamente en un pipeline de despliegue
 * sin levantar el resto del proceso del orquestador.
 * =================================================================
 */

use dotenvy::dotenv;
use reelforge_infra_db::schema::apply_full_sovereign_schema;
use reelforge_infra_db::TursoClient;
use reelforge_shared_telemetry::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("reelforge_migrator");

    let runtime_orchestrator = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime_orchestrator.block_on(async {
        info!("🚀 [MIGRATOR]: initiating structural audit of persisted strata");

        let database_url = std::env::var("REELFORGE_DB_DSN")
            .expect("CRITICAL_FAULT: REELFORGE_DB_DSN undefined in terminal context");
        let database_token = std::env::var("REELFORGE_DB_AUTH_TOKEN").ok();

        let database_client = match TursoClient::connect(&database_url, database_token).await {
            Ok(client) => client,
            Err(connection_error) => {
                error!("❌ [UPLINK_FAULT]: failed to establish link to database: {}", connection_error);
                return Err(anyhow::anyhow!(connection_error));
            }
        };

        let database_connection =
            database_client.get_connection().map_err(|error| anyhow::anyhow!("POOL_EXHAUSTED: {}", error))?;

        match apply_full_sovereign_schema(&database_connection).await {
            Ok(_) => {
                info!("✨ [MIGRATOR_SUCCESS]: schema is current");
                Ok(())
            }
            Err(schema_fault) => {
                error!("💀 [SCHEMA_COLLAPSE]: fatal structural error: {}", schema_fault);
                std::process::exit(1);
            }
        }
    })
}
