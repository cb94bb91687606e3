// [apps/orchestrator/src/routes.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN ROUTING MATRIX (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE RED DEL ORQUESTADOR (§6)
 * =================================================================
 */

use std::time::Duration;

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{collaboration, export, production};
use crate::middleware::{auth_guard, health_guard};
use crate::state::AppState;

pub fn create_router(application_shared_state: AppState) -> Router {
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let production_stratum = Router::new()
        .route("/", post(production::create_production))
        .route("/:id", get(production::get_production))
        .route("/:id/advance", post(production::advance_production))
        .route("/:id/pause", post(production::pause_production))
        .route("/:id/resume", post(production::resume_production))
        .route("/:id/cancel", post(production::cancel_production))
        .route("/:id/progress", get(production::get_progress))
        .route("/:id/export/estimate", post(export::estimate_export))
        .route("/:id/export/confirm", post(export::confirm_export))
        .route("/:id/invitations", post(collaboration::invite_collaborator))
        .route("/:id/collaborators", get(collaboration::list_collaborators))
        .route("/:id/collaborators/:tenant_id/role", post(collaboration::change_collaborator_role))
        .route("/:id/collaborators/:tenant_id", axum::routing::delete(collaboration::remove_collaborator));

    let invitations_stratum =
        Router::new().route("/:id/accept", post(collaboration::accept_invitation));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest(
            "/api/v1",
            Router::new()
                .nest("/production", production_stratum)
                .nest("/invitations", invitations_stratum)
                .layer(middleware::from_fn_with_state(application_shared_state.clone(), health_guard))
                .layer(middleware::from_fn_with_state(application_shared_state.clone(), auth_guard)),
        )
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
