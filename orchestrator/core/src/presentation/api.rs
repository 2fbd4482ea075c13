// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::bailiff::Bailiff;
use crate::domain::agent::{AgentId, AgentRecord};
use crate::domain::bailiff::{BailiffError, BailiffInterface};
use crate::domain::entry::ArgValue;
use crate::domain::host::PingResponse;

pub struct AppState {
    pub bailiff: Arc<Bailiff>,
}

pub fn app(bailiff: Arc<Bailiff>) -> Router {
    let state = Arc::new(AppState { bailiff });

    Router::new()
        .route("/ping", get(ping))
        .route("/properties/{key}", get(get_property).put(set_property))
        .route("/migrate", post(migrate))
        .route("/agents", get(list_agents))
        .route("/agents/{id}/it", get(is_it).post(agent_has_it))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRequest {
    pub agent: AgentRecord,
    pub entry: String,
    #[serde(default)]
    pub args: Vec<ArgValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPropertyRequest {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub accepting: bool,
    pub resident: usize,
}

/// Boundary error rendered as its tagged JSON form.
pub struct ApiError(pub BailiffError);

impl From<BailiffError> for ApiError {
    fn from(e: BailiffError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BailiffError::EntryNotFound { .. } | BailiffError::AgentNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            BailiffError::RemoteUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(self.0)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn ping(State(state): State<Arc<AppState>>) -> ApiResult<Json<PingResponse>> {
    Ok(Json(state.bailiff.ping().await?))
}

async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<PropertyValue>> {
    let value = state.bailiff.get_property(&key).await?;
    Ok(Json(PropertyValue { value }))
}

async fn set_property(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<SetPropertyRequest>,
) -> ApiResult<StatusCode> {
    state.bailiff.set_property(&key, &payload.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn migrate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MigrationRequest>,
) -> ApiResult<StatusCode> {
    state
        .bailiff
        .migrate(payload.agent, &payload.entry, payload.args)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

async fn list_agents(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AgentId>>> {
    Ok(Json(state.bailiff.list_agents().await?))
}

async fn is_it(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AgentId>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.bailiff.is_it(id).await?))
}

async fn agent_has_it(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AgentId>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.bailiff.agent_has_it(id).await?))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        accepting: state.bailiff.is_accepting(),
        resident: state.bailiff.registry().len(),
    })
}
