//! Material request repository

use async_trait::async_trait;
use bt_models::{MaterialRequest, RequestStatus, Urgency};
use chrono::NaiveDate;
use sqlx::FromRow;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::MaterialRequestStore;
use crate::PgStore;

#[derive(Debug, Clone, FromRow)]
pub struct MaterialRequestRow {
    pub id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub project_id: String,
    pub project_name: String,
    pub material_name: String,
    pub requested_quantity: f64,
    pub unit: String,
    pub urgency: String,
    pub reason: String,
    pub notes: Option<String>,
    pub status: String,
    pub request_date: NaiveDate,
    pub approved_by: Option<String>,
    pub approved_by_id: Option<String>,
    pub approved_date: Option<NaiveDate>,
    pub fulfilled_date: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
}

impl TryFrom<MaterialRequestRow> for MaterialRequest {
    type Error = RepositoryError;

    fn try_from(row: MaterialRequestRow) -> Result<Self, Self::Error> {
        let status = RequestStatus::parse(&row.status).ok_or_else(|| {
            RepositoryError::Validation(format!("request {} has unknown status {}", row.id, row.status))
        })?;
        let urgency = Urgency::parse(&row.urgency).ok_or_else(|| {
            RepositoryError::Validation(format!("request {} has unknown urgency {}", row.id, row.urgency))
        })?;
        Ok(MaterialRequest {
            id: row.id,
            worker_id: row.worker_id,
            worker_name: row.worker_name,
            project_id: row.project_id,
            project_name: row.project_name,
            material_name: row.material_name,
            requested_quantity: row.requested_quantity,
            unit: row.unit,
            urgency,
            reason: row.reason,
            notes: row.notes,
            status,
            request_date: row.request_date,
            approved_by: row.approved_by,
            approved_by_id: row.approved_by_id,
            approved_date: row.approved_date,
            fulfilled_date: row.fulfilled_date,
            rejection_reason: row.rejection_reason,
        })
    }
}

const REQUEST_COLUMNS: &str = "id, worker_id, worker_name, project_id, project_name, material_name, \
     requested_quantity, unit, urgency, reason, notes, status, request_date, approved_by, \
     approved_by_id, approved_date, fulfilled_date, rejection_reason";

#[async_trait]
impl MaterialRequestStore for PgStore {
    async fn list_material_requests(&self) -> RepositoryResult<Vec<MaterialRequest>> {
        let rows = sqlx::query_as::<_, MaterialRequestRow>(&format!(
            "SELECT {} FROM material_requests ORDER BY request_date DESC, created_at DESC",
            REQUEST_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(MaterialRequest::try_from).collect()
    }

    async fn find_material_request(&self, id: &str) -> RepositoryResult<Option<MaterialRequest>> {
        let row = sqlx::query_as::<_, MaterialRequestRow>(&format!(
            "SELECT {} FROM material_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        row.map(MaterialRequest::try_from).transpose()
    }

    async fn insert_material_request(&self, request: MaterialRequest) -> RepositoryResult<MaterialRequest> {
        let row = sqlx::query_as::<_, MaterialRequestRow>(&format!(
            r#"
            INSERT INTO material_requests ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {cols}
            "#,
            cols = REQUEST_COLUMNS
        ))
        .bind(&request.id)
        .bind(&request.worker_id)
        .bind(&request.worker_name)
        .bind(&request.project_id)
        .bind(&request.project_name)
        .bind(&request.material_name)
        .bind(request.requested_quantity)
        .bind(&request.unit)
        .bind(request.urgency.as_str())
        .bind(&request.reason)
        .bind(&request.notes)
        .bind(request.status.as_str())
        .bind(request.request_date)
        .bind(&request.approved_by)
        .bind(&request.approved_by_id)
        .bind(request.approved_date)
        .bind(request.fulfilled_date)
        .bind(&request.rejection_reason)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_insert(e, "material request"))?;

        MaterialRequest::try_from(row)
    }

    async fn transition_material_request(
        &self,
        updated: MaterialRequest,
        expected: RequestStatus,
    ) -> RepositoryResult<MaterialRequest> {
        let row = sqlx::query_as::<_, MaterialRequestRow>(&format!(
            r#"
            UPDATE material_requests
            SET status = $3, approved_by = $4, approved_by_id = $5, approved_date = $6,
                fulfilled_date = $7, rejection_reason = $8
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(&updated.id)
        .bind(expected.as_str())
        .bind(updated.status.as_str())
        .bind(&updated.approved_by)
        .bind(&updated.approved_by_id)
        .bind(updated.approved_date)
        .bind(updated.fulfilled_date)
        .bind(&updated.rejection_reason)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => MaterialRequest::try_from(row),
            None => match self.find_material_request(&updated.id).await? {
                Some(current) => Err(RepositoryError::Conflict(format!(
                    "request {} is already {}",
                    current.id, current.status
                ))),
                None => Err(RepositoryError::not_found("material request", &updated.id)),
            },
        }
    }
}
