// [apps/orchestrator/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: PERIMETER GUARDS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: GUARDIA DE SALUD Y RESOLUCIÓN DE IDENTIDAD DE TENANT
 *
 * La verificación criptográfica real de credenciales de operador es
 * responsabilidad de un colaborador externo (§1, §6): este guardia solo
 * exige un secreto compartido de despliegue más un `X-Tenant-Id` ya resuelto,
 * y los traduce a la extensión `TenantIdentity` que consume cada handler.
 * =================================================================
 */

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use reelforge_domain_models::TenantId;

use crate::state::AppState;

/// Identidad de tenant resuelta por `auth_guard`, consumida por los
/// handlers de producción/colaboración/exportación.
#[derive(Debug, Clone, Copy)]
pub struct TenantIdentity {
    pub tenant_id: TenantId,
}

/**
 * Guardia de salud: bloquea el acceso si el sistema está en mantenimiento.
 */
pub async fn health_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Err(reason) = state.is_operational() {
        warn!("⛔ [ACCESS_DENIED]: sector under maintenance: {}", reason);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "STRATA_MAINTENANCE_ACTIVE",
                "reason": reason,
                "retry_after": 60
            })),
        )
            .into_response();
    }
    next.run(req).await
}

/**
 * Guardia de autenticación: exige `Authorization: Bearer <secreto>` más
 * `X-Tenant-Id: <uuid>`. No decodifica ni verifica firma alguna — yield de
 * un tenant id verificado es todo lo que este aparato le pide a la capa de
 * identidad real, que vive fuera de este workspace.
 */
pub async fn auth_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = bearer else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    if token != state.auth_shared_secret.as_ref() {
        warn!("❌ [AUTH_REJECTION]: shared secret mismatch");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let tenant_id = req
        .headers()
        .get("x-tenant-id")
        .and_then(|h| h.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .map(TenantId)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(TenantIdentity { tenant_id });
    Ok(next.run(req).await)
}
