// [apps/orchestrator/src/main.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR MAIN ENTRY POINT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 * =================================================================
 */

use dotenvy::dotenv;
use reelforge_orchestrator::config::Config;
use reelforge_orchestrator::kernel::OrchestratorKernel;
use reelforge_shared_telemetry::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("reelforge_orchestrator");

    let runtime_orchestrator = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime_orchestrator.block_on(async {
        info!("🛰️  [COMMAND_CENTER]: ignition sequence starting...");

        let config = match Config::from_env() {
            Ok(config) => config,
            Err(config_error) => {
                error!("❌ [CONFIG_FAULT]: environment resolution failed: {}", config_error);
                std::process::exit(1);
            }
        };

        let kernel_instance = match OrchestratorKernel::ignite(config).await {
            Ok(kernel) => kernel,
            Err(ignition_error) => {
                error!("💀 [IGNITION_FAILED]: kernel assembly collapsed: {}", ignition_error);
                std::process::exit(1);
            }
        };

        info!("🚀 [REELFORGE_ONLINE]: system fully operational.");
        kernel_instance.launch_sovereign_operations().await
    })
}
