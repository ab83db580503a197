//! Work log API handlers

use axum::{extract::State, http::StatusCode, Json};
use bt_contracts::work_logs::WorkLogInput;
use bt_models::WorkLog;
use bt_queries::WorkLogFilter;
use bt_services::{LogWorkService, QueryService};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiQuery, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogListQuery {
    pub project_id: Option<String>,
    pub worker_id: Option<String>,
}

impl WorkLogListQuery {
    fn into_filter(self) -> WorkLogFilter {
        let mut filter = WorkLogFilter::new();
        if let Some(project_id) = self.project_id.filter(|p| !p.is_empty()) {
            filter = filter.project(project_id);
        }
        if let Some(worker_id) = self.worker_id.filter(|w| !w.is_empty()) {
            filter = filter.worker(worker_id);
        }
        filter
    }
}

/// GET /api/work_logs
pub async fn list_work_logs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<WorkLogListQuery>,
) -> ApiResult<Json<Vec<WorkLog>>> {
    let logs = QueryService::new(state.context(&user))
        .work_logs(&query.into_filter())
        .await?;
    Ok(Json(logs))
}

/// POST /api/work_logs
pub async fn create_work_log(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(input): ApiJson<WorkLogInput>,
) -> ApiResult<(StatusCode, Json<WorkLog>)> {
    let log = LogWorkService::new(state.context(&user))
        .call(input)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(log)))
}
