// [libs/core/workflow/src/engine.rs]
/*!
 * APARATO: WORKFLOW ENGINE
 * CLASIFICACIÓN: CORE LOGIC (ESTRATO L2-CORE)
 * RESPONSABILIDAD: AVANCE SERIALIZADO DE UNA PRODUCCIÓN A TRAVÉS DE §4.3
 *
 * Registro de locks por producción (`Arc<StdMutex<HashMap<ProductionId,
 * Arc<TokioMutex<()>>>>>`), generalizado del `Mutex<VecDeque<_>>` de
 * `MissionControlManager` a un lock por clave. El orden de anidación
 * tenant-fuera-de-producción (§5) se respeta soltando el lock de
 * producción antes de tomar el de tenant en la etapa `RENDER`, y
 * reingresando el de producción mientras el de tenant sigue sostenido.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::instrument;

use reelforge_core_pricing::{commit_debit, refund};
use reelforge_domain_models::{
    CharacterModelOutput, CurrentStage, ErrorKind, LastError, LipSyncOutput, Production, ProductionId,
    ProductionStatus, RenderOutput, SceneDescriptor, ScriptParseOutput, SoundMatchOutput, StageId,
    StoryboardOutput, TenantAccount, TenantId,
};
use reelforge_infra_db::{ProductionRepository, TenantRepository, VersionRepository};

use crate::errors::WorkflowError;
use crate::registry::{RetryPolicy, StageRegistry, StageSpec};
use crate::worker::{StageInput, StageOutput, StageWorkerError};

type KeyedLock<K> = StdMutex<HashMap<K, Arc<AsyncMutex<()>>>>;

pub struct WorkflowEngine {
    production_store: Arc<ProductionRepository>,
    tenant_store: Arc<TenantRepository>,
    version_store: Arc<VersionRepository>,
    registry: Arc<StageRegistry>,
    production_locks: KeyedLock<ProductionId>,
    tenant_locks: KeyedLock<TenantId>,
    cancel_signals: StdMutex<HashMap<ProductionId, watch::Sender<bool>>>,
}

impl WorkflowEngine {
    pub fn new(
        production_store: Arc<ProductionRepository>,
        tenant_store: Arc<TenantRepository>,
        version_store: Arc<VersionRepository>,
        registry: Arc<StageRegistry>,
    ) -> Self {
        Self {
            production_store,
            tenant_store,
            version_store,
            registry,
            production_locks: StdMutex::new(HashMap::new()),
            tenant_locks: StdMutex::new(HashMap::new()),
            cancel_signals: StdMutex::new(HashMap::new()),
        }
    }

    pub async fn load_production(&self, id: ProductionId) -> Result<Production, WorkflowError> {
        Ok(self.production_store.load(id).await?)
    }

    pub async fn load_tenant(&self, id: TenantId) -> Result<TenantAccount, WorkflowError> {
        Ok(self.tenant_store.load(id).await?)
    }

    fn keyed_lock<K: std::hash::Hash + Eq + Clone>(registry: &KeyedLock<K>, key: K) -> Arc<AsyncMutex<()>> {
        let mut guard = registry.lock().expect("lock registry poisoned");
        guard.entry(key).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    fn production_lock(&self, id: ProductionId) -> Arc<AsyncMutex<()>> {
        Self::keyed_lock(&self.production_locks, id)
    }

    fn tenant_lock(&self, id: TenantId) -> Arc<AsyncMutex<()>> {
        Self::keyed_lock(&self.tenant_locks, id)
    }

    fn cancel_sender(&self, id: ProductionId) -> watch::Sender<bool> {
        let mut guard = self.cancel_signals.lock().expect("cancel signal registry poisoned");
        guard.entry(id).or_insert_with(|| watch::channel(false).0).clone()
    }

    /// §4.6 `start`: precondición `status = CREATED`. Solo transiciona el
    /// estado; no ejecuta ninguna etapa (el llamador invoca `step` o
    /// `run_to_completion` por separado).
    #[instrument(skip(self))]
    pub async fn start(&self, production_id: ProductionId) -> Result<Production, WorkflowError> {
        let lock = self.production_lock(production_id);
        let _guard = lock.lock().await;
        let mut production = self.production_store.load(production_id).await?;
        if production.status != ProductionStatus::Created {
            return Err(WorkflowError::InvalidStatus(production.status));
        }
        production.status = ProductionStatus::Running;
        production.updated_at = Utc::now();
        self.persist_with_retry(&mut production).await?;
        Ok(production)
    }

    /// §4.6 `step`: ejecuta exactamente la siguiente etapa pendiente y
    /// retorna. No auto-avanza.
    #[instrument(skip(self))]
    pub async fn step(&self, production_id: ProductionId) -> Result<Production, WorkflowError> {
        let lock = self.production_lock(production_id);
        let mut guard = lock.lock().await;

        let mut production = self.production_store.load(production_id).await?;
        if !matches!(production.status, ProductionStatus::Running | ProductionStatus::Created) {
            return Ok(production);
        }

        let stage = match production.current_stage {
            CurrentStage::Terminal => {
                production.status = ProductionStatus::Completed;
                production.updated_at = Utc::now();
                self.persist_with_retry(&mut production).await?;
                return Ok(production);
            }
            CurrentStage::Stage(stage) => stage,
        };

        let input = match self.registry.input_selector(&production, stage) {
            Ok(input) => input,
            Err(WorkflowError::MissingPrerequisite(missing)) => {
                self.fail(&mut production, stage, ErrorKind::MissingPrerequisite, format!("missing output of {missing:?}"))
                    .await?;
                return Ok(production);
            }
            Err(other) => return Err(other),
        };

        if self.registry.is_skippable(&production, stage) {
            self.apply_output(&mut production, empty_output_for(stage));
            production.updated_at = Utc::now();
            self.persist_with_retry(&mut production).await?;
            return Ok(production);
        }

        if stage == StageId::Render {
            // Orden de anidación §5: soltar el lock de producción antes de
            // tomar el de tenant, luego reingresar el de producción.
            drop(guard);
            let tenant_id = production.tenant_id;
            let tenant_lock = self.tenant_lock(tenant_id);
            let _tenant_guard = tenant_lock.lock().await;
            guard = lock.lock().await;

            production = self.production_store.load(production_id).await?;
            if !matches!(production.status, ProductionStatus::Running | ProductionStatus::Created) {
                return Ok(production);
            }

            let tenant = self.tenant_store.load(tenant_id).await?;
            let debit = match commit_debit(tenant.tier, tenant.quota_minutes_remaining, production.config.target_minutes) {
                Ok(debit) => debit,
                Err(err) => {
                    let message = err.to_string();
                    self.fail(&mut production, stage, ErrorKind::InsufficientQuota, message).await?;
                    return Ok(production);
                }
            };
            self.tenant_store.update_quota(tenant_id, debit.quota_after).await?;
            production.render_cost_debited = Some(debit.cost);

            let cancel_tx = self.cancel_sender(production_id);
            if *cancel_tx.borrow() {
                // Ya señalizado: no se debe manufacturar un fallo de etapa a
                // partir de una cancelación. Quota permanece debitada (§9
                // "no refund on cancel"), solo cambia el status.
                production.status = ProductionStatus::Cancelled;
                production.updated_at = Utc::now();
                self.persist_with_retry(&mut production).await?;
                return Ok(production);
            }

            let cancel_rx = cancel_tx.subscribe();
            match self.execute_with_retry(self.registry.spec(stage), input, cancel_rx).await {
                Ok(output) => {
                    if *cancel_tx.borrow() {
                        production.status = ProductionStatus::Cancelled;
                        production.updated_at = Utc::now();
                        self.persist_with_retry(&mut production).await?;
                        return Ok(production);
                    }
                    self.apply_output(&mut production, output);
                    production.updated_at = Utc::now();
                    self.persist_with_retry(&mut production).await?;
                    Ok(production)
                }
                Err(err) => {
                    if *cancel_tx.borrow() {
                        production.status = ProductionStatus::Cancelled;
                        production.updated_at = Utc::now();
                        self.persist_with_retry(&mut production).await?;
                        return Ok(production);
                    }
                    let refunded = refund(debit.quota_after, production.config.target_minutes);
                    self.tenant_store.update_quota(tenant_id, refunded).await?;
                    self.fail(&mut production, stage, ErrorKind::StagePermanent, err.to_string()).await?;
                    Ok(production)
                }
            }
        } else {
            let cancel_tx = self.cancel_sender(production_id);
            if *cancel_tx.borrow() {
                production.status = ProductionStatus::Cancelled;
                production.updated_at = Utc::now();
                self.persist_with_retry(&mut production).await?;
                return Ok(production);
            }

            let cancel_rx = cancel_tx.subscribe();
            match self.execute_with_retry(self.registry.spec(stage), input, cancel_rx).await {
                Ok(output) => {
                    if *cancel_tx.borrow() {
                        production.status = ProductionStatus::Cancelled;
                        production.updated_at = Utc::now();
                        self.persist_with_retry(&mut production).await?;
                        return Ok(production);
                    }
                    self.apply_output(&mut production, output);
                    production.updated_at = Utc::now();
                    self.persist_with_retry(&mut production).await?;
                    Ok(production)
                }
                Err(err) => {
                    if *cancel_tx.borrow() {
                        production.status = ProductionStatus::Cancelled;
                        production.updated_at = Utc::now();
                        self.persist_with_retry(&mut production).await?;
                        return Ok(production);
                    }
                    self.fail(&mut production, stage, ErrorKind::StagePermanent, err.to_string()).await?;
                    Ok(production)
                }
            }
        }
    }

    /// §4.6 `run_to_completion`: repite `step` hasta estado terminal o
    /// pausa. Como `step` libera el lock de producción entre llamadas, una
    /// pausa concurrente simplemente aparece como `status = PAUSED` en el
    /// siguiente `step`, que entonces retorna sin ejecutar nada más.
    #[instrument(skip(self))]
    pub async fn run_to_completion(&self, production_id: ProductionId) -> Result<Production, WorkflowError> {
        loop {
            let production = self.step(production_id).await?;
            if production.status != ProductionStatus::Running {
                return Ok(production);
            }
        }
    }

    /// §4.6 `pause`: cooperativo. Tomar el lock de producción basta para
    /// esperar a que cualquier etapa en curso termine, ya que `step` lo
    /// sostiene durante toda la invocación del worker.
    #[instrument(skip(self))]
    pub async fn pause(&self, production_id: ProductionId) -> Result<Production, WorkflowError> {
        let lock = self.production_lock(production_id);
        let _guard = lock.lock().await;
        let mut production = self.production_store.load(production_id).await?;
        if !matches!(production.status, ProductionStatus::Running | ProductionStatus::Created) {
            return Ok(production);
        }
        production.status = ProductionStatus::Paused;
        production.updated_at = Utc::now();
        self.persist_with_retry(&mut production).await?;
        Ok(production)
    }

    #[instrument(skip(self))]
    pub async fn resume(&self, production_id: ProductionId) -> Result<Production, WorkflowError> {
        let lock = self.production_lock(production_id);
        let _guard = lock.lock().await;
        let mut production = self.production_store.load(production_id).await?;
        if production.status != ProductionStatus::Paused {
            return Err(WorkflowError::InvalidStatus(production.status));
        }
        production.status = ProductionStatus::Running;
        production.updated_at = Utc::now();
        self.persist_with_retry(&mut production).await?;
        Ok(production)
    }

    /// §4.6 `cancel`: idempotente. Señaliza primero (para que un worker en
    /// curso pueda abortar antes de que se libere el lock), luego toma el
    /// lock de producción para persistir `CANCELLED`.
    #[instrument(skip(self))]
    pub async fn cancel(&self, production_id: ProductionId) -> Result<Production, WorkflowError> {
        let _ = self.cancel_sender(production_id).send(true);

        let lock = self.production_lock(production_id);
        let _guard = lock.lock().await;
        let mut production = self.production_store.load(production_id).await?;
        if matches!(production.status, ProductionStatus::Completed | ProductionStatus::Cancelled) {
            return Ok(production);
        }
        production.status = ProductionStatus::Cancelled;
        production.updated_at = Utc::now();
        self.persist_with_retry(&mut production).await?;
        Ok(production)
    }

    fn apply_output(&self, production: &mut Production, output: StageOutput) {
        match output {
            StageOutput::ScriptParse(o) => production.stage_outputs.script_parse = Some(o),
            StageOutput::CharacterModel(o) => production.stage_outputs.character_model = Some(o),
            StageOutput::Storyboard(o) => production.stage_outputs.storyboard = Some(o),
            StageOutput::LipSync(o) => production.stage_outputs.lip_sync = Some(o),
            StageOutput::SoundMatch(o) => production.stage_outputs.sound_match = Some(o),
            StageOutput::Render(o) => production.stage_outputs.render = Some(o),
        }
        production.current_stage = production.stage_outputs.next_stage();
    }

    async fn fail(
        &self,
        production: &mut Production,
        stage: StageId,
        kind: ErrorKind,
        message: String,
    ) -> Result<(), WorkflowError> {
        production.status = ProductionStatus::Failed;
        production.last_error = Some(LastError {
            stage: Some(stage),
            kind,
            message,
            occurred_at: Utc::now(),
        });
        production.updated_at = Utc::now();
        self.persist_with_retry(production).await
    }

    /// Persiste con CAS sobre `version`; en `VersionConflict` recarga y
    /// reintenta exactamente una vez (§7 "VersionConflict is recovered
    /// locally once"), reaplicando los mismos campos mutados por el
    /// llamador sobre la copia recién cargada.
    async fn persist_with_retry(&self, production: &mut Production) -> Result<(), WorkflowError> {
        match self.production_store.update(production).await {
            Ok(()) => {
                production.version += 1;
                self.version_store.record_snapshot(production, Utc::now()).await.ok();
                Ok(())
            }
            Err(reelforge_infra_db::DbError::VersionConflict) => {
                let mut reloaded = self.production_store.load(production.id).await?;
                reloaded.status = production.status;
                reloaded.current_stage = production.current_stage;
                reloaded.stage_outputs = production.stage_outputs.clone();
                reloaded.last_error = production.last_error.clone();
                reloaded.render_cost_debited = production.render_cost_debited;
                reloaded.updated_at = production.updated_at;
                self.production_store.update(&reloaded).await?;
                reloaded.version += 1;
                self.version_store.record_snapshot(&reloaded, Utc::now()).await.ok();
                *production = reloaded;
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Reintenta una etapa hasta `max_attempts` con backoff exponencial
    /// sobre errores transitorios y de tiempo de espera (§4.3, §5); un
    /// error permanente aborta de inmediato.
    async fn execute_with_retry(
        &self,
        spec: &StageSpec,
        input: StageInput,
        cancel_rx: watch::Receiver<bool>,
    ) -> Result<StageOutput, WorkflowError> {
        let RetryPolicy { max_attempts, base_backoff } = spec.retry_policy;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let call = spec.worker.execute(input.clone(), cancel_rx.clone());
            let outcome = tokio::time::timeout(spec.timeout, call).await;
            let stage = input.stage();
            match outcome {
                Ok(Ok(output)) => return Ok(output),
                Ok(Err(StageWorkerError::Permanent(message))) => {
                    return Err(WorkflowError::StagePermanent { stage, message });
                }
                Ok(Err(transient)) if attempt < max_attempts => {
                    tokio::time::sleep(base_backoff * 2u32.pow(attempt - 1)).await;
                    tracing::warn!(attempt, %transient, "[STAGE_RETRY]: reintentando etapa {:?}", stage);
                    continue;
                }
                Ok(Err(exhausted)) => {
                    return Err(WorkflowError::StagePermanent {
                        stage,
                        message: format!("exhausted {max_attempts} attempts: {exhausted}"),
                    });
                }
                Err(_elapsed) if attempt < max_attempts => {
                    tokio::time::sleep(base_backoff * 2u32.pow(attempt - 1)).await;
                    tracing::warn!(attempt, "[STAGE_TIMEOUT_RETRY]: reintentando etapa {:?}", stage);
                    continue;
                }
                Err(_elapsed) => {
                    return Err(WorkflowError::StagePermanent {
                        stage,
                        message: format!("exhausted {max_attempts} attempts after repeated timeouts"),
                    });
                }
            }
        }
    }
}

fn empty_output_for(stage: StageId) -> StageOutput {
    match stage {
        StageId::ScriptParse => StageOutput::ScriptParse(ScriptParseOutput { scenes: Vec::<SceneDescriptor>::new() }),
        StageId::CharacterModel => StageOutput::CharacterModel(CharacterModelOutput { characters: vec![] }),
        StageId::Storyboard => StageOutput::Storyboard(StoryboardOutput { frames: vec![] }),
        StageId::LipSync => StageOutput::LipSync(LipSyncOutput { keyframes_by_character: vec![] }),
        StageId::SoundMatch => StageOutput::SoundMatch(SoundMatchOutput { placements: vec![] }),
        StageId::Render => {
            // RENDER nunca es omisible (§4.3); este brazo existe solo para
            // que el `match` sea exhaustivo.
            StageOutput::Render(RenderOutput {
                artifact: reelforge_domain_models::ArtifactRef::new(""),
                rendered_minutes: 0.0,
            })
        }
    }
}
