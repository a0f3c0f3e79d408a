//! End-to-end test: the HTTP front end runs a full discovery.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use discovery_daemon::{create_router, AppState, DiscoveryEngine};
use discovery_explorer::ExplorerConfig;
use discovery_oracle::{FnEvaluator, HashedEmbedding, SimulatedOracle};
use discovery_population::PopulationConfig;
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

fn engine() -> DiscoveryEngine {
    DiscoveryEngine::new(
        Arc::new(SimulatedOracle::new().with_hints_per_critique(2)),
        Arc::new(HashedEmbedding::default()),
        Arc::new(FnEvaluator::line_count()),
        PopulationConfig::default().with_seed(21),
        ExplorerConfig::default().with_generations(20),
    )
}

#[tokio::test]
async fn process_returns_best_candidate() {
    let (_tx, rx) = watch::channel(false);
    let app = create_router(AppState::new(Arc::new(engine()), rx), false);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/process")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "evaluator_program": null,
                "initial_program": "result = 1",
                "initial_base_prompt": "make result as large as possible",
                "generations": 4,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["report"]["generations"].as_array().unwrap().len(), 4);
    assert!(body["report"]["population_size"].as_u64().unwrap() >= 5);
    assert_eq!(body["result"], body["report"]["best"]);
    assert!(body["result"]["score"].as_f64().unwrap() >= 2.0);
}

#[cfg(unix)]
#[tokio::test]
async fn process_with_subprocess_evaluator() {
    use discovery_oracle::ProcessEvaluator;

    let evaluator = ProcessEvaluator::new(
        "sh",
        vec!["-c".into(), "cat > /dev/null; echo '{\"score\": 4, \"output\": \"ok\"}'".into()],
    );
    let engine = DiscoveryEngine::new(
        Arc::new(SimulatedOracle::new()),
        Arc::new(HashedEmbedding::default()),
        Arc::new(evaluator),
        PopulationConfig::default().with_seed(2),
        ExplorerConfig::default().with_generations(2),
    );
    let (_tx, rx) = watch::channel(false);
    let app = create_router(AppState::new(Arc::new(engine), rx), true);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/process")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "initial_program": "result = 1",
                "initial_base_prompt": "grow",
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["result"]["score"], 4.0);
}
