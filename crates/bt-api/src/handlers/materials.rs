//! Material API handlers

use axum::{extract::State, http::StatusCode, Json};
use bt_contracts::material_logs::MaterialLogInput;
use bt_models::MaterialMovement;
use bt_queries::{MaterialCounts, MaterialFilter, MaterialView, StockLevel};
use bt_services::{LogMaterialService, MaterialLogOutcome, QueryService};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, ApiQuery, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialListQuery {
    pub search: Option<String>,
    pub stock_level: Option<String>,
}

impl MaterialListQuery {
    fn into_filter(self) -> ApiResult<MaterialFilter> {
        let mut filter = MaterialFilter::new();
        if let Some(search) = self.search {
            filter = filter.search(search);
        }
        if let Some(level) = self.stock_level.filter(|s| !s.is_empty() && s != "all") {
            let level = StockLevel::parse(&level)
                .ok_or_else(|| ApiError::bad_request(format!("unknown stock level: {}", level)))?;
            filter = filter.stock_level(level);
        }
        Ok(filter)
    }
}

/// GET /api/materials
///
/// Each material carries `stockRatio`, `stockLevel` and `usedPercentage`.
pub async fn list_materials(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<MaterialListQuery>,
) -> ApiResult<Json<Vec<MaterialView>>> {
    let filter = query.into_filter()?;
    let materials = QueryService::new(state.context(&user)).materials(&filter).await?;
    Ok(Json(materials))
}

/// GET /api/materials/counts
pub async fn material_counts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MaterialCounts>> {
    let counts = QueryService::new(state.context(&user)).material_counts().await?;
    Ok(Json(counts))
}

/// GET /api/materials/logs
pub async fn list_movements(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<MaterialMovement>>> {
    let movements = QueryService::new(state.context(&user)).movements().await?;
    Ok(Json(movements))
}

/// POST /api/materials/logs
///
/// Workers record usage, suppliers record deliveries.
pub async fn log_material(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(input): ApiJson<MaterialLogInput>,
) -> ApiResult<(StatusCode, Json<MaterialLogOutcome>)> {
    let outcome = LogMaterialService::new(state.context(&user))
        .call(input)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
