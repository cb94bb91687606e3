// [apps/orchestrator/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR SOVEREIGN KERNEL (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 * =================================================================
 */

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tracing::{error, info, instrument};

use reelforge_infra_db::TursoClient;

use crate::config::Config;
use crate::routes::create_router;
use crate::services::spawn_version_reaper;
use crate::state::AppState;

pub struct OrchestratorKernel {
    server_network_port: u16,
    application_state: AppState,
}

impl OrchestratorKernel {
    /// Resuelve la configuración, establece el enlace a la base de datos y
    /// ensambla el grafo de dependencias de la aplicación.
    #[instrument(skip_all)]
    pub async fn ignite(config: Config) -> anyhow::Result<Self> {
        let database_client = TursoClient::connect(&config.db_dsn, config.db_auth_token.clone())
            .await
            .context("FATAL: database link collapse, ignition aborted")?;

        let application_state = AppState::new(&config, database_client).context("FATAL: dependency graph assembly failed")?;

        Ok(Self { server_network_port: config.port, application_state })
    }

    /// Lanza el daemon de higiene de versiones y levanta el servidor HTTP.
    pub async fn launch_sovereign_operations(self) -> anyhow::Result<()> {
        spawn_version_reaper(self.application_state.clone()).await;

        let router = create_router(self.application_state);
        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), self.server_network_port);

        info!("🚀 [KERNEL_ONLINE]: orchestrator listening at {}", bind_address);

        let tcp_listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .context("CRITICAL_FAULT: failed to bind network port")?;

        if let Err(server_error) = axum::serve(tcp_listener, router).await {
            error!("💀 [KERNEL_COLLAPSE]: runtime failure: {}", server_error);
            return Err(server_error.into());
        }
        Ok(())
    }
}
