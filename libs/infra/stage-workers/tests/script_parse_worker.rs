// [libs/infra/stage-workers/tests/script_parse_worker.rs]
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reelforge_core_workflow::{StageInput, StageOutput, StageWorker};
use reelforge_domain_models::StageId;
use reelforge_infra_stage_workers::{ScriptParseWorker, StageHttpClient};

#[tokio::test]
async fn posts_script_and_maps_response_into_script_parse_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/script-parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "scenes": [{
                "scene_id": "S1",
                "scene_type": "dialogue",
                "actions": ["enter"],
                "emotions": ["neutral"],
                "keywords": ["kitchen"],
                "duration_estimate_seconds": 12.5,
            }]
        })))
        .mount(&server)
        .await;

    let http = StageHttpClient::new(server.uri(), "test-token");
    let worker = ScriptParseWorker::new(http);
    let (_tx, rx) = watch::channel(false);

    let input = StageInput::ScriptParse(reelforge_core_workflow::worker::ScriptParseInput {
        script: "INT. KITCHEN - DAY".to_string(),
    });

    let output = worker.execute(input, rx).await.expect("worker call should succeed");
    let StageOutput::ScriptParse(result) = output else {
        panic!("expected ScriptParse output");
    };
    assert_eq!(result.scenes.len(), 1);
    assert_eq!(result.scenes[0].scene_id, "S1");
    assert_eq!(worker.stage(), StageId::ScriptParse);
}

#[tokio::test]
async fn server_error_surfaces_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/script-parse"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let http = StageHttpClient::new(server.uri(), "test-token");
    let worker = ScriptParseWorker::new(http);
    let (_tx, rx) = watch::channel(false);

    let input = StageInput::ScriptParse(reelforge_core_workflow::worker::ScriptParseInput {
        script: "INT. KITCHEN - DAY".to_string(),
    });

    let err = worker.execute(input, rx).await.unwrap_err();
    assert!(matches!(err, reelforge_core_workflow::StageWorkerError::Transient(_)));
}
