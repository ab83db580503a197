//! Worker and supplier directory handlers

use axum::{extract::State, Json};
use bt_models::Supplier;
use bt_services::{DirectoryService, WorkerSummary};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/workers
pub async fn list_workers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<WorkerSummary>>> {
    let workers = DirectoryService::new(state.context(&user)).workers().await?;
    Ok(Json(workers))
}

/// GET /api/suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Supplier>>> {
    let suppliers = DirectoryService::new(state.context(&user)).suppliers().await?;
    Ok(Json(suppliers))
}
