//! Material request API handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bt_contracts::material_requests::MaterialRequestInput;
use bt_core::traits::Id;
use bt_models::{MaterialRequest, RequestStatus, RequestTransition};
use bt_queries::RequestFilter;
use bt_services::{QueryService, SubmitMaterialRequestService, TransitionMaterialRequestService};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, ApiQuery, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub project_id: Option<String>,
}

impl RequestListQuery {
    fn into_filter(self) -> ApiResult<RequestFilter> {
        let mut filter = RequestFilter::new();
        if let Some(status) = self.status.filter(|s| !s.is_empty() && s != "all") {
            let status = RequestStatus::parse(&status)
                .ok_or_else(|| ApiError::bad_request(format!("unknown request status: {}", status)))?;
            filter = filter.status(status);
        }
        if let Some(project_id) = self.project_id.filter(|p| !p.is_empty()) {
            filter = filter.project(project_id);
        }
        Ok(filter)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectBody {
    #[serde(default)]
    pub reason: Option<String>,
}

impl RejectBody {
    /// An empty body is a rejection without a reason
    fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("Failed to parse the request body as JSON: {}", e)))
    }
}

/// GET /api/material_requests
pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<RequestListQuery>,
) -> ApiResult<Json<Vec<MaterialRequest>>> {
    let filter = query.into_filter()?;
    let requests = QueryService::new(state.context(&user))
        .material_requests(&filter)
        .await?;
    Ok(Json(requests))
}

/// POST /api/material_requests
pub async fn submit_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(input): ApiJson<MaterialRequestInput>,
) -> ApiResult<(StatusCode, Json<MaterialRequest>)> {
    let request = SubmitMaterialRequestService::new(state.context(&user))
        .call(input)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn transition(
    state: &AppState,
    user: &AuthenticatedUser,
    id: &str,
    transition: RequestTransition,
) -> ApiResult<Json<MaterialRequest>> {
    let request = TransitionMaterialRequestService::new(state.context(user))
        .call(id, transition)
        .await
        .into_result()?;
    Ok(Json(request))
}

/// POST /api/material_requests/:id/approve
pub async fn approve_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<MaterialRequest>> {
    transition(&state, &user, &id, RequestTransition::Approve).await
}

/// POST /api/material_requests/:id/reject
///
/// The body (`{"reason": ...}`) may be omitted; the rejection then fails
/// for want of a reason.
pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    body: Bytes,
) -> ApiResult<Json<MaterialRequest>> {
    let reason = RejectBody::parse(&body)?.reason.unwrap_or_default();
    transition(&state, &user, &id, RequestTransition::Reject { reason }).await
}

/// POST /api/material_requests/:id/fulfill
pub async fn fulfill_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<MaterialRequest>> {
    transition(&state, &user, &id, RequestTransition::Fulfill).await
}
