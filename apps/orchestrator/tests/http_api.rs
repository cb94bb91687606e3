// [apps/orchestrator/tests/http_api.rs]
//! Pruebas de integración HTTP sobre el router completo (§6): cada caso
//! levanta un `AppState` propio respaldado por libSQL en memoria y despacha
//! peticiones contra `create_router` vía `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reelforge_domain_models::{SubscriptionTier, TenantAccount};
use reelforge_infra_db::TursoClient;
use reelforge_orchestrator::config::{Config, StageModelEndpoints, StorageConfig};
use reelforge_orchestrator::routes::create_router;
use reelforge_orchestrator::state::AppState;

const SHARED_SECRET: &str = "test-shared-secret";

fn unreachable_stage_models() -> StageModelEndpoints {
    StageModelEndpoints {
        script_parse_base_url: "http://127.0.0.1:1".to_string(),
        character_model_base_url: "http://127.0.0.1:1".to_string(),
        storyboard_base_url: "http://127.0.0.1:1".to_string(),
        lip_sync_base_url: "http://127.0.0.1:1".to_string(),
        sound_match_base_url: "http://127.0.0.1:1".to_string(),
        render_base_url: "http://127.0.0.1:1".to_string(),
        bearer_token: "unused-in-tests".to_string(),
    }
}

async fn test_state_with_stage_models(stage_models: StageModelEndpoints) -> (AppState, tempfile::TempDir) {
    let database_client = TursoClient::connect(":memory:", None).await.expect("in-memory libsql link should succeed");
    let artifact_root = tempfile::tempdir().expect("tempdir should be creatable");

    let config = Config {
        port: 0,
        db_dsn: ":memory:".to_string(),
        db_auth_token: None,
        storage: StorageConfig::Local { root: artifact_root.path().to_path_buf() },
        stage_models,
        auth_shared_secret: SHARED_SECRET.to_string(),
        auth_token_ttl_seconds: 3600,
        retry_max_attempts_hint: 3,
        retry_backoff_base_seconds_hint: 1,
        tier_table_overrides: None,
    };

    let state = AppState::new(&config, database_client).expect("dependency graph should assemble");
    (state, artifact_root)
}

async fn test_state() -> (AppState, tempfile::TempDir) {
    test_state_with_stage_models(unreachable_stage_models()).await
}

async fn seed_tenant(state: &AppState, tier: SubscriptionTier, quota_minutes: f64) -> reelforge_domain_models::TenantId {
    let tenant = TenantAccount::new(
        format!("{}@reelforge.dev", uuid::Uuid::new_v4()),
        "unused-in-tests".to_string(),
        tier,
        quota_minutes,
        "Test Tenant".to_string(),
        chrono::Utc::now(),
    );
    state.tenant_repository.create(&tenant).await.expect("tenant seed should succeed");
    tenant.id
}

fn authed_request(
    method: &str,
    uri: &str,
    tenant_id: reelforge_domain_models::TenantId,
    body: Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {SHARED_SECRET}"))
        .header("x-tenant-id", tenant_id.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn create_production_payload() -> Value {
    json!({
        "script": "INT. ROOFTOP - NIGHT. A courier discovers the city's last working elevator.",
        "character_refs": [],
        "narration_ref": null,
        "config": {
            "aspect": "nine16",
            "quality": "p720",
            "format": "mp4",
            "target_minutes": 2.0,
        }
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Monta respuestas de éxito para las cuatro etapas previas a `RENDER`
/// (`LIP_SYNC` se omite porque `create_production_payload` no fija
/// `narration_ref`). `RENDER` queda deliberadamente sin mock: si algún
/// camino de la prueba lo alcanzara por error, el worker fallaría al
/// resolver `http://127.0.0.1:1` en lugar de completar en silencio.
async fn mount_pre_render_stage_mocks(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/script-parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scenes": [{
                "scene_id": "S1",
                "scene_type": "dialogue",
                "actions": ["enter"],
                "emotions": ["neutral"],
                "keywords": ["rooftop"],
                "duration_estimate_seconds": 8.0,
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/character-model"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "characters": [] })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/storyboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "frames": [{ "frame_index": 0, "scene_id": "S1", "artifact": "frame-0-ref" }]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/sound-match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "placements": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn rejects_requests_without_a_bearer_token() {
    let (state, _root) = test_state().await;
    let router = create_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/production/00000000-0000-0000-0000-000000000000")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creates_and_reads_back_a_production() {
    let (state, _root) = test_state().await;
    let tenant_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let router = create_router(state);

    let create_request = authed_request("POST", "/api/v1/production", tenant_id, create_production_payload());
    let create_response = router.clone().oneshot(create_request).await.unwrap();
    assert_eq!(create_response.status(), StatusCode::CREATED);
    let created = body_json(create_response).await;
    let production_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "created");

    let get_request = authed_request("GET", &format!("/api/v1/production/{production_id}"), tenant_id, Value::Null);
    let get_response = router.oneshot(get_request).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);
    let fetched = body_json(get_response).await;
    assert_eq!(fetched["id"], production_id);
}

#[tokio::test]
async fn a_stranger_tenant_cannot_read_someone_elses_production() {
    let (state, _root) = test_state().await;
    let owner_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let stranger_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let router = create_router(state);

    let create_request = authed_request("POST", "/api/v1/production", owner_id, create_production_payload());
    let created = body_json(router.clone().oneshot(create_request).await.unwrap()).await;
    let production_id = created["id"].as_str().unwrap().to_string();

    let stranger_request =
        authed_request("GET", &format!("/api/v1/production/{production_id}"), stranger_id, Value::Null);
    let response = router.oneshot(stranger_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn pause_before_start_transitions_directly_to_paused_and_resume_reverts_to_running() {
    let (state, _root) = test_state().await;
    let tenant_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let router = create_router(state);

    let created =
        body_json(router.clone().oneshot(authed_request("POST", "/api/v1/production", tenant_id, create_production_payload())).await.unwrap())
            .await;
    let production_id = created["id"].as_str().unwrap().to_string();

    let pause_response = router
        .clone()
        .oneshot(authed_request("POST", &format!("/api/v1/production/{production_id}/pause"), tenant_id, Value::Null))
        .await
        .unwrap();
    assert_eq!(pause_response.status(), StatusCode::OK);
    let paused = body_json(pause_response).await;
    assert_eq!(paused["status"], "paused");

    let resume_response = router
        .oneshot(authed_request("POST", &format!("/api/v1/production/{production_id}/resume"), tenant_id, Value::Null))
        .await
        .unwrap();
    assert_eq!(resume_response.status(), StatusCode::OK);
    let resumed = body_json(resume_response).await;
    assert_eq!(resumed["status"], "running");
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let (state, _root) = test_state().await;
    let tenant_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let router = create_router(state);

    let created =
        body_json(router.clone().oneshot(authed_request("POST", "/api/v1/production", tenant_id, create_production_payload())).await.unwrap())
            .await;
    let production_id = created["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(authed_request("POST", &format!("/api/v1/production/{production_id}/cancel"), tenant_id, Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cancelled = body_json(response).await;
        assert_eq!(cancelled["status"], "cancelled");
    }
}

#[tokio::test]
async fn export_estimate_reports_needs_payment_for_a_free_tier_tenant_over_quota() {
    let (state, _root) = test_state().await;
    let tenant_id = seed_tenant(&state, SubscriptionTier::Free, 0.5).await;
    let router = create_router(state);

    let created =
        body_json(router.clone().oneshot(authed_request("POST", "/api/v1/production", tenant_id, create_production_payload())).await.unwrap())
            .await;
    let production_id = created["id"].as_str().unwrap().to_string();

    let response = router
        .oneshot(authed_request(
            "POST",
            &format!("/api/v1/production/{production_id}/export/estimate"),
            tenant_id,
            json!({ "minutes": 2.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let estimate = body_json(response).await;
    assert_eq!(estimate["needs_payment"], true);
}

#[tokio::test]
async fn export_confirm_declines_without_user_confirmation() {
    let (state, _root) = test_state().await;
    let tenant_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let router = create_router(state);

    let created =
        body_json(router.clone().oneshot(authed_request("POST", "/api/v1/production", tenant_id, create_production_payload())).await.unwrap())
            .await;
    let production_id = created["id"].as_str().unwrap().to_string();

    let response = router
        .oneshot(authed_request(
            "POST",
            &format!("/api/v1/production/{production_id}/export/confirm"),
            tenant_id,
            json!({ "minutes": 2.0, "confirmed": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = body_json(response).await;
    assert_eq!(error["error"], "declined_by_user");
}

#[tokio::test]
async fn invites_a_collaborator_and_the_invitee_accepts_by_matching_email() {
    let (state, _root) = test_state().await;
    let owner_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let invitee_id = seed_tenant(&state, SubscriptionTier::Free, 0.0).await;
    let router = create_router(state.clone());

    let created =
        body_json(router.clone().oneshot(authed_request("POST", "/api/v1/production", owner_id, create_production_payload())).await.unwrap())
            .await;
    let production_id = created["id"].as_str().unwrap().to_string();

    let invitee = state.tenant_repository.load(invitee_id).await.unwrap();

    let invite_response = router
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/v1/production/{production_id}/invitations"),
            owner_id,
            json!({ "invitee_email": invitee.email, "role": "editor" }),
        ))
        .await
        .unwrap();
    assert_eq!(invite_response.status(), StatusCode::CREATED);
    let invitation = body_json(invite_response).await;
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    let accept_response = router
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/v1/invitations/{invitation_id}/accept"),
            invitee_id,
            json!({ "acceptor_email": invitee.email }),
        ))
        .await
        .unwrap();
    assert_eq!(accept_response.status(), StatusCode::OK);
    let accepted = body_json(accept_response).await;
    assert_eq!(accepted["status"], "accepted");

    let collaborators_response = router
        .oneshot(authed_request(
            "GET",
            &format!("/api/v1/production/{production_id}/collaborators"),
            invitee_id,
            Value::Null,
        ))
        .await
        .unwrap();
    assert_eq!(collaborators_response.status(), StatusCode::OK);
    let grants = body_json(collaborators_response).await;
    assert_eq!(grants.as_array().unwrap().len(), 1);
    assert_eq!(grants[0]["role"], "editor");
}

#[tokio::test]
async fn editor_collaborator_cannot_drive_advance_run_through_render() {
    let stage_model_server = MockServer::start().await;
    mount_pre_render_stage_mocks(&stage_model_server).await;
    let mut stage_models = unreachable_stage_models();
    stage_models.script_parse_base_url = stage_model_server.uri();
    stage_models.character_model_base_url = stage_model_server.uri();
    stage_models.storyboard_base_url = stage_model_server.uri();
    stage_models.sound_match_base_url = stage_model_server.uri();

    let (state, _root) = test_state_with_stage_models(stage_models).await;
    let owner_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let editor_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let router = create_router(state.clone());

    let created =
        body_json(router.clone().oneshot(authed_request("POST", "/api/v1/production", owner_id, create_production_payload())).await.unwrap())
            .await;
    let production_id = created["id"].as_str().unwrap().to_string();

    let editor = state.tenant_repository.load(editor_id).await.unwrap();
    let invitation = body_json(
        router
            .clone()
            .oneshot(authed_request(
                "POST",
                &format!("/api/v1/production/{production_id}/invitations"),
                owner_id,
                json!({ "invitee_email": editor.email, "role": "editor" }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    let accept_response = router
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/v1/invitations/{invitation_id}/accept"),
            editor_id,
            json!({ "acceptor_email": editor.email }),
        ))
        .await
        .unwrap();
    assert_eq!(accept_response.status(), StatusCode::OK);

    let quota_before_advance = state.tenant_repository.load(owner_id).await.unwrap().quota_minutes_remaining;

    let advance_response = router
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/v1/production/{production_id}/advance"),
            editor_id,
            json!({ "mode": "run" }),
        ))
        .await
        .unwrap();
    assert_eq!(advance_response.status(), StatusCode::FORBIDDEN);

    let production_after = body_json(
        router
            .clone()
            .oneshot(authed_request("GET", &format!("/api/v1/production/{production_id}"), owner_id, Value::Null))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(production_after["current_stage"], json!({ "Stage": "Render" }));
    assert_eq!(production_after["status"], "running");

    let quota_after_advance = state.tenant_repository.load(owner_id).await.unwrap().quota_minutes_remaining;
    assert_eq!(
        quota_before_advance, quota_after_advance,
        "an editor-role advance must not debit the owner's quota by driving through RENDER"
    );
}

#[tokio::test]
async fn cancel_set_before_advance_yields_cancelled_not_failed_with_no_refund_debit() {
    let stage_model_server = MockServer::start().await;
    mount_pre_render_stage_mocks(&stage_model_server).await;
    let mut stage_models = unreachable_stage_models();
    stage_models.script_parse_base_url = stage_model_server.uri();
    stage_models.character_model_base_url = stage_model_server.uri();
    stage_models.storyboard_base_url = stage_model_server.uri();
    stage_models.sound_match_base_url = stage_model_server.uri();

    let (state, _root) = test_state_with_stage_models(stage_models).await;
    let tenant_id = seed_tenant(&state, SubscriptionTier::Professional, 50.0).await;
    let router = create_router(state.clone());

    let created =
        body_json(router.clone().oneshot(authed_request("POST", "/api/v1/production", tenant_id, create_production_payload())).await.unwrap())
            .await;
    let production_id = created["id"].as_str().unwrap().to_string();

    // Avanza hasta quedar parado justo antes de RENDER, igual que la prueba
    // hermana de arriba, para que el siguiente `step` sea la invocación a
    // la etapa que compromete cuota.
    loop {
        let response = router
            .clone()
            .oneshot(authed_request(
                "POST",
                &format!("/api/v1/production/{production_id}/advance"),
                tenant_id,
                json!({ "mode": "step" }),
            ))
            .await
            .unwrap();
        let production = body_json(response).await;
        if production["current_stage"] == json!({ "Stage": "Render" }) {
            break;
        }
    }

    // Cuota justo antes de que el siguiente `step` dispare RENDER: el
    // commit_debit ocurre dentro de esa misma llamada, antes de que el
    // motor revise la bandera de cancelación.
    let quota_before_render_step = state.tenant_repository.load(tenant_id).await.unwrap().quota_minutes_remaining;

    // La cancelación llega antes de que el motor dispare la siguiente
    // etapa: `WorkflowEngine::step` debe detectar la bandera de
    // cancelación antes de invocar el worker de RENDER en lugar de dejar
    // que el worker fabrique un error permanente por "cancelled before
    // dispatch", que antes se traducía incorrectamente en reembolso +
    // `FAILED`.
    let cancel_response = router
        .clone()
        .oneshot(authed_request("POST", &format!("/api/v1/production/{production_id}/cancel"), tenant_id, Value::Null))
        .await
        .unwrap();
    assert_eq!(cancel_response.status(), StatusCode::OK);

    let advance_response = router
        .oneshot(authed_request(
            "POST",
            &format!("/api/v1/production/{production_id}/advance"),
            tenant_id,
            json!({ "mode": "step" }),
        ))
        .await
        .unwrap();
    assert_eq!(advance_response.status(), StatusCode::OK);
    let production_after = body_json(advance_response).await;
    assert_eq!(production_after["status"], "cancelled");
    assert!(production_after["last_error"].is_null(), "cancellation must not leave a stale stage-failure error behind");

    let debited_cost = production_after["render_cost_debited"].as_f64().expect("RENDER must have debited before observing cancellation");
    assert!(debited_cost > 0.0);

    let quota_after_cancel = state.tenant_repository.load(tenant_id).await.unwrap().quota_minutes_remaining;
    assert_eq!(
        quota_after_cancel,
        quota_before_render_step - debited_cost,
        "no refund must follow a debit that raced a pending cancellation (no-refund-on-cancel policy)"
    );
}
