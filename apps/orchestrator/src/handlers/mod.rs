// [apps/orchestrator/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: SERVICE ORCHESTRATION HUB (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION ADAPTERS (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE PUNTOS DE ENTRADA (HANDLERS)
 *
 * # Topología de Módulos:
 * - production:    CRUD de producciones y avance del pipeline (§4.6).
 * - export:        Protocolo de dos fases para `RENDER` (§4.7).
 * - collaboration: Invitaciones y concesiones de colaborador (§4.5).
 * =================================================================
 */

pub mod collaboration;
pub mod export;
pub mod production;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use reelforge_core_workflow::WorkflowError;
use reelforge_infra_db::DbError;

/// Envoltorio uniforme de error HTTP para todos los handlers: traduce el
/// catálogo de `WorkflowError` (§7) a un código de estado y un cuerpo JSON
/// con `error` (la variante de `ErrorKind`) y `message` (diagnóstico legible).
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn forbidden() -> Self {
        Self { status: StatusCode::FORBIDDEN, kind: "forbidden", message: "effective role does not permit this operation".into() }
    }

    pub fn invalid_input(message: impl ToString) -> Self {
        Self { status: StatusCode::UNPROCESSABLE_ENTITY, kind: "invalid_input", message: message.to_string() }
    }

    pub fn not_found() -> Self {
        Self { status: StatusCode::NOT_FOUND, kind: "not_found", message: "entity not found".into() }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(error: WorkflowError) -> Self {
        let kind = error.to_error_kind();
        let status = match &error {
            WorkflowError::Store(DbError::NotFound) => StatusCode::NOT_FOUND,
            WorkflowError::Store(DbError::Conflict) => StatusCode::CONFLICT,
            WorkflowError::Store(DbError::VersionConflict) => StatusCode::CONFLICT,
            WorkflowError::Forbidden => StatusCode::FORBIDDEN,
            WorkflowError::InsufficientQuota { .. } => StatusCode::PAYMENT_REQUIRED,
            WorkflowError::DeclinedByUser => StatusCode::CONFLICT,
            WorkflowError::MissingPrerequisite(_) => StatusCode::CONFLICT,
            WorkflowError::StagePermanent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::InvalidStatus(_) => StatusCode::CONFLICT,
            WorkflowError::RegistryIncomplete(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, kind: kind_label(kind), message: error.to_string() }
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        let status = match error {
            DbError::NotFound => StatusCode::NOT_FOUND,
            DbError::Conflict => StatusCode::CONFLICT,
            DbError::VersionConflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, kind: "store_fault", message: error.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.kind, "message": self.message }))).into_response()
    }
}

fn kind_label(kind: reelforge_domain_models::ErrorKind) -> &'static str {
    use reelforge_domain_models::ErrorKind::*;
    match kind {
        NotFound => "not_found",
        Forbidden => "forbidden",
        VersionConflict => "version_conflict",
        InsufficientQuota => "insufficient_quota",
        DeclinedByUser => "declined_by_user",
        MissingPrerequisite => "missing_prerequisite",
        StageTransient => "stage_transient",
        StagePermanent => "stage_permanent",
        StageTimeout => "stage_timeout",
        InvalidInput => "invalid_input",
    }
}
