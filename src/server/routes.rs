//! Route handlers: job kickoff, job status, and health.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::screenshot::validate_base64_image;
use crate::server::error::{ServerError, ServerResult};
use crate::server::state::AppState;
use crate::store::JobRecord;
use crate::summary::{Summary, summarize};

/// Body of `POST /kickoff`. Both fields are required; they are optional here
/// so that a missing field yields our own error message.
#[derive(Debug, Default, Deserialize,)]
pub struct KickoffRequest {
    #[serde(default)]
    pub base64image: Option<String,>,
    #[serde(default)]
    pub xml_url:     Option<String,>,
}

#[derive(Debug, Serialize, Deserialize,)]
pub struct KickoffResponse {
    pub kickoff_id: String,
}

#[derive(Debug, Serialize, Deserialize,)]
pub struct StatusResponse {
    pub kickoff_id: String,
    pub data:       Summary,
    pub state:      String,
}

#[derive(Debug, Serialize, Deserialize,)]
pub struct HealthResponse {
    pub status:         String,
    pub version:        String,
    pub jobs:           usize,
    pub uptime_seconds: u64,
}

/// `POST /kickoff`: validate the screenshot, fetch and summarize the UI dump,
/// and store the summary under a fresh kickoff id.
pub async fn kickoff(
    State(state,): State<Arc<AppState,>,>,
    payload: Result<Json<KickoffRequest,>, JsonRejection,>,
) -> ServerResult<Json<KickoffResponse,>,> {
    let Json(request,) =
        payload.map_err(|rejection| ServerError::BadRequest(rejection.body_text(),),)?;

    let required =
        || ServerError::BadRequest("base64image and xml_url are required".to_string(),);
    let base64image = request.base64image.filter(|s| !s.is_empty(),).ok_or_else(required,)?;
    let xml_url = request.xml_url.filter(|s| !s.is_empty(),).ok_or_else(required,)?;

    let image_format = if state.config.validate_image {
        Some(validate_base64_image(&base64image,)?,)
    } else {
        None
    };

    let document = state.fetcher.fetch(&xml_url,).await?;
    let summary = tokio::task::spawn_blocking(move || summarize(&document,),).await??;

    let record = JobRecord::new(xml_url, image_format, summary,);
    let kickoff_id = record.kickoff_id.clone();
    info!(
        %kickoff_id,
        xml_url = %record.xml_url,
        elements = record.summary.total_elements(),
        "job stored"
    );
    state.store.insert(record,);

    Ok(Json(KickoffResponse {
        kickoff_id,
    },),)
}

/// `GET /status/{kickoff_id}`
pub async fn status(
    State(state,): State<Arc<AppState,>,>,
    Path(kickoff_id,): Path<String,>,
) -> ServerResult<Json<StatusResponse,>,> {
    let record = state
        .store
        .get(&kickoff_id,)
        .ok_or_else(|| ServerError::NotFound("kickoff_id not found".to_string(),),)?;

    Ok(Json(StatusResponse {
        kickoff_id,
        data: Summary::clone(&record.summary,),
        state: "SUCCESS".to_string(),
    },),)
}

/// `GET /health`
pub async fn health(State(state,): State<Arc<AppState,>,>,) -> Json<HealthResponse,> {
    Json(HealthResponse {
        status:         "ok".to_string(),
        version:        env!("CARGO_PKG_VERSION").to_string(),
        jobs:           state.store.len(),
        uptime_seconds: state.uptime_seconds(),
    },)
}

/// Fallback for unknown routes
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Not found".to_string(),)
}
