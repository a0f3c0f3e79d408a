//! Discovery run handler

use axum::{extract::State, Json};
use discovery_explorer::RunReport;
use discovery_types::BestCandidate;
use serde::Serialize;

use crate::api::state::AppState;
use crate::engine::DiscoveryRequest;
use crate::error::ApiResult;

/// Completed run
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: String,
    pub result: BestCandidate,
    pub report: RunReport,
}

/// Run a fresh population to completion and return the best candidate.
pub async fn process(
    State(state): State<AppState>,
    Json(request): Json<DiscoveryRequest>,
) -> ApiResult<Json<ProcessResponse>> {
    let report = state
        .engine
        .run(&request, Some(state.shutdown_rx.clone()))
        .await?;

    tracing::info!(
        run_id = %report.run_id,
        best = %report.best.candidate_id,
        score = report.best.score,
        "process request completed"
    );

    Ok(Json(ProcessResponse {
        status: "completed".to_string(),
        result: report.best.clone(),
        report,
    }))
}
