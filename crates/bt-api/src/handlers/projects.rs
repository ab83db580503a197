//! Project API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bt_core::traits::Id;
use bt_models::{Project, ProjectStatus};
use bt_queries::{ProjectCounts, ProjectDetail, ProjectFilter};
use bt_services::{CreateProjectService, ProjectParams, QueryService, UpdateProjectService};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, ApiQuery, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ProjectListQuery {
    fn into_filter(self) -> ApiResult<ProjectFilter> {
        let mut filter = ProjectFilter::new();
        if let Some(search) = self.search {
            filter = filter.search(search);
        }
        if let Some(status) = self.status.filter(|s| !s.is_empty() && s != "all") {
            let status = ProjectStatus::parse(&status)
                .ok_or_else(|| ApiError::bad_request(format!("unknown project status: {}", status)))?;
            filter = filter.status(status);
        }
        Ok(filter)
    }
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let filter = query.into_filter()?;
    let projects = QueryService::new(state.context(&user)).projects(&filter).await?;
    Ok(Json(projects))
}

/// GET /api/projects/counts
pub async fn project_counts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<ProjectCounts>> {
    let counts = QueryService::new(state.context(&user)).project_counts().await?;
    Ok(Json(counts))
}

/// GET /api/projects/loggable
pub async fn loggable_projects(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = QueryService::new(state.context(&user)).loggable_projects().await?;
    Ok(Json(projects))
}

/// GET /api/projects/:id
///
/// The project with its progress, budget use, logs and team figures.
pub async fn get_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<ProjectDetail>> {
    let detail = QueryService::new(state.context(&user)).project_detail(&id).await?;
    Ok(Json(detail))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(params): ApiJson<ProjectParams>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = CreateProjectService::new(state.context(&user))
        .call(params)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    ApiJson(params): ApiJson<ProjectParams>,
) -> ApiResult<Json<Project>> {
    let project = UpdateProjectService::new(state.context(&user))
        .call(&id, params)
        .await
        .into_result()?;
    Ok(Json(project))
}
