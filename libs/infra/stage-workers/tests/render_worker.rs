// [libs/infra/stage-workers/tests/render_worker.rs]
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reelforge_core_workflow::worker::RenderInput;
use reelforge_core_workflow::{StageInput, StageOutput, StageWorker, StageWorkerError};
use reelforge_domain_models::{AspectRatio, ProductionConfig, RenderFormat, RenderQuality};
use reelforge_infra_stage_workers::{RenderWorker, StageHttpClient};

fn sample_input() -> StageInput {
    StageInput::Render(RenderInput {
        frames: vec![],
        narration_ref: None,
        placements: vec![],
        config: ProductionConfig::new(AspectRatio::Nine16, RenderQuality::P1080, RenderFormat::Mp4, 2.0).unwrap(),
    })
}

#[tokio::test]
async fn already_cancelled_signal_short_circuits_before_dispatch() {
    let server = MockServer::start().await;
    // No mock registered for /v1/render: a dispatched request would panic
    // wiremock on an unexpected call, proving the worker never sends one.
    let http = StageHttpClient::new(server.uri(), "test-token");
    let worker = RenderWorker::new(http);
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let err = worker.execute(sample_input(), rx).await.unwrap_err();
    assert!(matches!(err, StageWorkerError::Permanent(_)));
}

#[tokio::test]
async fn successful_render_maps_artifact_and_minutes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/render"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "artifact": "renders/out.mp4",
            "rendered_minutes": 2.0,
        })))
        .mount(&server)
        .await;

    let http = StageHttpClient::new(server.uri(), "test-token");
    let worker = RenderWorker::new(http);
    let (_tx, rx) = watch::channel(false);

    let output = worker.execute(sample_input(), rx).await.expect("render should succeed");
    let StageOutput::Render(result) = output else {
        panic!("expected Render output");
    };
    assert_eq!(result.rendered_minutes, 2.0);
    assert_eq!(result.artifact.as_str(), "renders/out.mp4");
}
