//! Health check handler and response type.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use smsmock_core::{CdnProvider, RendererKind};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub renderer: RendererKind,
    pub provider: CdnProvider,
}

/// Liveness plus the active rendering strategy and default CDN provider.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        renderer: state.mockups.renderer_kind(),
        provider: state.uploaders.default_provider(),
    })
}
