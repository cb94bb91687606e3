// [apps/orchestrator/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: SHARED APPLICATION STATE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ENSAMBLAJE DEL GRAFO DE DEPENDENCIAS COMPARTIDO
 *
 * `AppState::new` es el único punto donde se construyen los cuatro
 * repositorios, el Stage Registry de seis workers, el Workflow Engine y el
 * Artifact Store — cada handler recibe una copia barata (`Clone`, todo campo
 * es `Arc`) vía `axum::extract::State`.
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, instrument, warn};

use reelforge_core_workflow::{StageRegistry, StageWorker, WorkflowEngine, WorkflowError};
use reelforge_domain_models::StageId;
use reelforge_infra_artifact_store::{ArtifactStore, LocalFsArtifactStore, S3ArtifactStore};
use reelforge_infra_db::{CollaborationRepository, ProductionRepository, TenantRepository, TursoClient, VersionRepository};
use reelforge_infra_stage_workers::{
    CharacterModelWorker, LipSyncWorker, RenderWorker, ScriptParseWorker, SoundMatchWorker, StageHttpClient,
    StoryboardWorker,
};

use crate::config::{Config, StorageConfig};

/// Modos de salud del sistema para la interceptación de middleware perimetral.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemMode {
    /// El sistema procesa peticiones HTTP de forma nominal.
    Operational,
    /// El sistema ha suspendido el despacho por mantenimiento.
    Maintenance(String),
}

/**
 * Contenedor de estado compartido (thread-safe) para el orquestador. Cada
 * handler recibe una copia vía `axum::extract::State<AppState>`.
 */
#[derive(Clone)]
pub struct AppState {
    pub production_repository: Arc<ProductionRepository>,
    pub tenant_repository: Arc<TenantRepository>,
    pub collaboration_repository: Arc<CollaborationRepository>,
    pub version_repository: Arc<VersionRepository>,
    pub workflow_engine: Arc<WorkflowEngine>,
    pub artifact_store: Arc<dyn ArtifactStore>,
    pub auth_shared_secret: Arc<str>,
    current_system_mode: Arc<RwLock<SystemMode>>,
}

impl AppState {
    /// Construye el grafo de dependencias de la aplicación. Cada repositorio
    /// recibe su propia `Connection` de `libsql` — el driver subyacente la
    /// multiplexa internamente, así que no hay necesidad de compartir una
    /// sola conexión entre los cuatro repositorios.
    #[instrument(skip(config, database_client))]
    pub fn new(config: &Config, database_client: TursoClient) -> Result<Self, WorkflowError> {
        let production_repository = Arc::new(ProductionRepository::new(database_client.get_connection()?));
        let tenant_repository = Arc::new(TenantRepository::new(database_client.get_connection()?));
        let collaboration_repository = Arc::new(CollaborationRepository::new(database_client.get_connection()?));
        let version_repository = Arc::new(VersionRepository::new(database_client.get_connection()?));

        let registry = Arc::new(build_stage_registry(config)?);
        let workflow_engine = Arc::new(WorkflowEngine::new(
            production_repository.clone(),
            tenant_repository.clone(),
            version_repository.clone(),
            registry,
        ));

        let artifact_store: Arc<dyn ArtifactStore> = match &config.storage {
            StorageConfig::Local { root } => Arc::new(LocalFsArtifactStore::new(root.clone())),
            StorageConfig::S3 { endpoint, bucket, .. } => {
                Arc::new(S3ArtifactStore::new(reqwest::Client::new(), endpoint.clone(), bucket.clone()))
            }
        };

        info!("🧬 [APP_STATE]: dependency graph assembled");

        Ok(Self {
            production_repository,
            tenant_repository,
            collaboration_repository,
            version_repository,
            workflow_engine,
            artifact_store,
            auth_shared_secret: Arc::from(config.auth_shared_secret.as_str()),
            current_system_mode: Arc::new(RwLock::new(SystemMode::Operational)),
        })
    }

    /**
     * Sincroniza el modo operativo del servidor para el control de acceso.
     */
    #[instrument(skip(self, target_system_mode))]
    pub fn set_mode(&self, target_system_mode: SystemMode) {
        match self.current_system_mode.write() {
            Ok(mut mode_guard) => {
                info!("🔄 [STATE_SHIFT]: system transitioning to mode: {:?}", target_system_mode);
                *mode_guard = target_system_mode;
            }
            Err(lock_poison_fault) => {
                tracing::error!("💀 [KERNEL_CRASH]: system mode lock poisoned: {}", lock_poison_fault);
            }
        }
    }

    /**
     * Evalúa la capacidad operativa ante ráfagas HTTP entrantes.
     */
    #[instrument(skip(self), level = "debug")]
    pub fn is_operational(&self) -> Result<(), String> {
        let mode_guard = self.current_system_mode.read().map_err(|e| format!("LOCK_POISON_FAULT: {}", e))?;

        match &*mode_guard {
            SystemMode::Operational => Ok(()),
            SystemMode::Maintenance(rejection_reason) => {
                warn!("⛔ [ACCESS_DENIED]: strata maintenance active: {}", rejection_reason);
                Err(rejection_reason.clone())
            }
        }
    }
}

fn build_stage_registry(config: &Config) -> Result<StageRegistry, WorkflowError> {
    let endpoints = &config.stage_models;
    let http_for =
        |stage: StageId| StageHttpClient::new(endpoints.base_url_for(stage).to_string(), endpoints.bearer_token.clone());

    let mut workers: HashMap<StageId, Arc<dyn StageWorker>> = HashMap::new();
    workers.insert(StageId::ScriptParse, Arc::new(ScriptParseWorker::new(http_for(StageId::ScriptParse))));
    workers.insert(StageId::CharacterModel, Arc::new(CharacterModelWorker::new(http_for(StageId::CharacterModel))));
    workers.insert(StageId::Storyboard, Arc::new(StoryboardWorker::new(http_for(StageId::Storyboard))));
    workers.insert(StageId::LipSync, Arc::new(LipSyncWorker::new(http_for(StageId::LipSync))));
    workers.insert(StageId::SoundMatch, Arc::new(SoundMatchWorker::new(http_for(StageId::SoundMatch))));
    workers.insert(StageId::Render, Arc::new(RenderWorker::new(http_for(StageId::Render))));

    StageRegistry::new(workers)
}
