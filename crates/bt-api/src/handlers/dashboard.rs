//! Dashboard handler

use axum::{extract::State, Json};
use bt_queries::Dashboard;
use bt_services::QueryService;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Dashboard>> {
    let dashboard = QueryService::new(state.context(&user)).dashboard().await?;
    Ok(Json(dashboard))
}
