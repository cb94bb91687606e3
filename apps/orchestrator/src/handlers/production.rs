// [apps/orchestrator/src/handlers/production.rs]
/*!
 * APARATO: PRODUCTION LIFECYCLE HANDLERS
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: CREACIÓN, LECTURA Y AVANCE DE PRODUCCIONES (§4.6, §6)
 */

use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use reelforge_core_workflow::snapshot;
use reelforge_domain_models::{
    ArtifactRef, AspectRatio, CurrentStage, Production, ProductionConfig, ProductionId, ProductionStatus,
    RenderFormat, RenderQuality, StageId,
};
use reelforge_domain_policy::{is_permitted, resolve_role, EffectiveRole, Operation};

use crate::handlers::ApiError;
use crate::middleware::TenantIdentity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductionConfigPayload {
    pub aspect: AspectRatio,
    pub quality: RenderQuality,
    pub format: RenderFormat,
    pub target_minutes: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductionRequest {
    pub script: String,
    #[serde(default)]
    pub character_refs: Vec<String>,
    pub narration_ref: Option<String>,
    pub config: ProductionConfigPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceModeRequest {
    Step,
    Run,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub mode: AdvanceModeRequest,
}

/// `POST production` — precondición: tenant autenticado (§6). La producción
/// nace en `CREATED`; `start` se dispara en la primera llamada a `advance`.
#[instrument(skip(state, body), fields(tenant = %identity.tenant_id))]
pub async fn create_production(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(body): Json<CreateProductionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.tenant_repository.load(identity.tenant_id).await?;

    let config = ProductionConfig::new(
        body.config.aspect,
        body.config.quality,
        body.config.format,
        body.config.target_minutes,
    )
    .map_err(ApiError::invalid_input)?;

    let production = Production::new(
        identity.tenant_id,
        body.script,
        body.character_refs.into_iter().map(ArtifactRef::new).collect(),
        body.narration_ref.map(ArtifactRef::new),
        config,
        Utc::now(),
    );

    state.production_repository.create(&production).await?;
    Ok((StatusCode::CREATED, Json(production)))
}

async fn authorize(
    state: &AppState,
    identity: &TenantIdentity,
    production_id: ProductionId,
    operation: Operation,
) -> Result<(Production, EffectiveRole), ApiError> {
    let production = state.workflow_engine.load_production(production_id).await?;
    let grants = state.collaboration_repository.list_grants(production_id).await?;
    let role = resolve_role(identity.tenant_id, &production, &grants);
    if !is_permitted(role, operation) {
        return Err(ApiError::forbidden());
    }
    Ok((production, role))
}

/// `GET production/{id}` — gated por la capacidad de lectura (§4.5).
#[instrument(skip(state), fields(tenant = %identity.tenant_id))]
pub async fn get_production(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
) -> Result<impl IntoResponse, ApiError> {
    let (production, _role) = authorize(&state, &identity, id, Operation::Read).await?;
    Ok(Json(production))
}

/// `POST production/{id}/advance` — invoca `start` si la producción aún no
/// arrancó, luego ejecuta exactamente un paso o corre hasta el final según
/// `mode`.
#[instrument(skip(state, body), fields(tenant = %identity.tenant_id))]
pub async fn advance_production(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
    Json(body): Json<AdvanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (production, role) = authorize(&state, &identity, id, Operation::AdvanceStage).await?;

    if production.status == ProductionStatus::Created {
        state.workflow_engine.start(id).await?;
    }

    // RENDER es la única etapa que compromete cuota (§4.2, §4.7): "advance
    // stage" (editor incluido) no autoriza por sí solo dispararla. Eso
    // requiere `Operation::TriggerExport`, igual que el Export Coordinator.
    let renders_without_consent = |p: &Production| {
        p.current_stage == CurrentStage::Stage(StageId::Render)
            && !is_permitted(role, Operation::TriggerExport)
    };

    match body.mode {
        AdvanceModeRequest::Step => {
            let current = state.workflow_engine.load_production(id).await?;
            if renders_without_consent(&current) {
                return Err(ApiError::forbidden());
            }
            let updated = state.workflow_engine.step(id).await?;
            Ok(Json(updated))
        }
        AdvanceModeRequest::Run => {
            let mut current = state.workflow_engine.load_production(id).await?;
            loop {
                if current.status != ProductionStatus::Running {
                    break;
                }
                if renders_without_consent(&current) {
                    return Err(ApiError::forbidden());
                }
                current = state.workflow_engine.step(id).await?;
            }
            Ok(Json(current))
        }
    }
}

/// `POST production/{id}/pause`.
#[instrument(skip(state), fields(tenant = %identity.tenant_id))]
pub async fn pause_production(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &identity, id, Operation::PauseResume).await?;
    let production = state.workflow_engine.pause(id).await?;
    Ok(Json(production))
}

/// `POST production/{id}/resume`.
#[instrument(skip(state), fields(tenant = %identity.tenant_id))]
pub async fn resume_production(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &identity, id, Operation::PauseResume).await?;
    let production = state.workflow_engine.resume(id).await?;
    Ok(Json(production))
}

/// `POST production/{id}/cancel` — idempotente (§4.6).
#[instrument(skip(state), fields(tenant = %identity.tenant_id))]
pub async fn cancel_production(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &identity, id, Operation::PauseResume).await?;
    let production = state.workflow_engine.cancel(id).await?;
    Ok(Json(production))
}

/// `GET production/{id}/progress` — vista derivada de §4.8, sin almacén propio.
#[instrument(skip(state), fields(tenant = %identity.tenant_id))]
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
) -> Result<impl IntoResponse, ApiError> {
    let (production, _role) = authorize(&state, &identity, id, Operation::Read).await?;
    Ok(Json(snapshot(&production)))
}
