//! Project repository
//!
//! Database operations for projects. Worker assignments live in the
//! `assigned_workers` array column.

use async_trait::async_trait;
use bt_models::{Project, ProjectStatus};
use chrono::NaiveDate;
use sqlx::FromRow;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::ProjectStore;
use crate::PgStore;

/// Project database entity
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub total_area: f64,
    pub completed_area: f64,
    pub budget: f64,
    pub spent_amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    pub assigned_workers: Vec<String>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = ProjectStatus::parse(&row.status).ok_or_else(|| {
            RepositoryError::Validation(format!("project {} has unknown status {}", row.id, row.status))
        })?;
        Ok(Project {
            id: row.id,
            name: row.name,
            description: row.description,
            status,
            total_area: row.total_area,
            completed_area: row.completed_area,
            budget: row.budget,
            spent_amount: row.spent_amount,
            start_date: row.start_date,
            end_date: row.end_date,
            location: row.location,
            assigned_workers: row.assigned_workers,
        })
    }
}

const PROJECT_COLUMNS: &str = "id, name, description, status, total_area, completed_area, budget, \
     spent_amount, start_date, end_date, location, assigned_workers";

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {} FROM projects ORDER BY created_at ASC, id ASC",
            PROJECT_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn find_project(&self, id: &str) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(Project::try_from).transpose()
    }

    async fn insert_project(&self, project: Project) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects (id, name, description, status, total_area, completed_area, budget,
                                  spent_amount, start_date, end_date, location, assigned_workers)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.total_area)
        .bind(project.completed_area)
        .bind(project.budget)
        .bind(project.spent_amount)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(&project.location)
        .bind(&project.assigned_workers)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_insert(e, "project"))?;

        Project::try_from(row)
    }

    async fn update_project(&self, project: Project) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects
            SET name = $2, description = $3, status = $4, total_area = $5, completed_area = $6,
                budget = $7, spent_amount = $8, start_date = $9, end_date = $10, location = $11,
                assigned_workers = $12
            WHERE id = $1
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.total_area)
        .bind(project.completed_area)
        .bind(project.budget)
        .bind(project.spent_amount)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(&project.location)
        .bind(&project.assigned_workers)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| RepositoryError::not_found("project", &project.id))?;

        Project::try_from(row)
    }
}
