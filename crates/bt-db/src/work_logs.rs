//! Work log repository

use async_trait::async_trait;
use bt_models::WorkLog;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::WorkLogStore;
use crate::PgStore;

#[derive(Debug, Clone, FromRow)]
pub struct WorkLogRow {
    pub id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub project_id: String,
    pub date: NaiveDate,
    pub area_completed: f64,
    pub rate_per_square_meter: f64,
    pub earnings: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<WorkLogRow> for WorkLog {
    fn from(row: WorkLogRow) -> Self {
        WorkLog {
            id: row.id,
            worker_id: row.worker_id,
            worker_name: row.worker_name,
            project_id: row.project_id,
            date: row.date,
            area_completed: row.area_completed,
            rate_per_square_meter: row.rate_per_square_meter,
            earnings: row.earnings,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

const WORK_LOG_COLUMNS: &str = "id, worker_id, worker_name, project_id, date, area_completed, \
     rate_per_square_meter, earnings, description, created_at";

#[async_trait]
impl WorkLogStore for PgStore {
    async fn list_work_logs(&self) -> RepositoryResult<Vec<WorkLog>> {
        let rows = sqlx::query_as::<_, WorkLogRow>(&format!(
            "SELECT {} FROM work_logs ORDER BY date DESC, created_at DESC",
            WORK_LOG_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(WorkLog::from).collect())
    }

    async fn insert_work_log(&self, log: WorkLog) -> RepositoryResult<WorkLog> {
        let row = sqlx::query_as::<_, WorkLogRow>(&format!(
            r#"
            INSERT INTO work_logs (id, worker_id, worker_name, project_id, date, area_completed,
                                   rate_per_square_meter, earnings, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            WORK_LOG_COLUMNS
        ))
        .bind(&log.id)
        .bind(&log.worker_id)
        .bind(&log.worker_name)
        .bind(&log.project_id)
        .bind(log.date)
        .bind(log.area_completed)
        .bind(log.rate_per_square_meter)
        .bind(log.earnings)
        .bind(&log.description)
        .bind(log.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_insert(e, "work log"))?;

        Ok(WorkLog::from(row))
    }
}
