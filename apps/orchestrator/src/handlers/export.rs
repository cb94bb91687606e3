// [apps/orchestrator/src/handlers/export.rs]
/*!
 * APARATO: EXPORT HANDLERS
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: PROTOCOLO DE DOS FASES ESTIMATE/CONFIRM SOBRE `RENDER` (§4.7)
 */

use axum::{
    extract::{Extension, Json, Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use reelforge_core_workflow::ExportCoordinator;
use reelforge_domain_policy::{is_permitted, resolve_role, Operation};

use crate::handlers::ApiError;
use crate::middleware::TenantIdentity;
use crate::state::AppState;
use reelforge_domain_models::ProductionId;

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    #[allow(dead_code)]
    pub minutes: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[allow(dead_code)]
    pub minutes: Option<f64>,
    pub confirmed: bool,
}

/// `POST production/{id}/export/estimate` — sin cambio de estado (§4.7 fase 1).
/// El `minutes` del cuerpo existe para simetría con §6 pero la estimación
/// usa `production.config.target_minutes`, la única duración que el
/// Workflow Engine honrará en la fase de confirmación.
#[instrument(skip(state, _body), fields(tenant = %identity.tenant_id))]
pub async fn estimate_export(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
    Json(_body): Json<EstimateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let production = state.workflow_engine.load_production(id).await?;
    let grants = state.collaboration_repository.list_grants(id).await?;
    let role = resolve_role(identity.tenant_id, &production, &grants);
    if !is_permitted(role, Operation::Read) {
        return Err(ApiError::forbidden());
    }

    let coordinator = ExportCoordinator::new(&state.workflow_engine);
    let estimate = coordinator.estimate(id).await?;
    Ok(Json(estimate.breakdown))
}

/// `POST production/{id}/export/confirm` — fase 2: `confirmed = false`
/// retorna `DeclinedByUser` sin tocar el estado; `confirmed = true` deja
/// correr exactamente la etapa `RENDER`.
#[instrument(skip(state, body), fields(tenant = %identity.tenant_id))]
pub async fn confirm_export(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<ProductionId>,
    Json(body): Json<ConfirmRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let grants = state.collaboration_repository.list_grants(id).await?;
    let coordinator = ExportCoordinator::new(&state.workflow_engine);
    let production = coordinator.confirm(id, identity.tenant_id, &grants, body.confirmed).await?;
    Ok(Json(production))
}
