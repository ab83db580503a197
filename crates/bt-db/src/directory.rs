//! Worker and supplier repository

use async_trait::async_trait;
use bt_models::{Supplier, Worker};
use sqlx::{FromRow, PgConnection};

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::DirectoryStore;
use crate::PgStore;

/// Worker profile with its assignments gathered from `projects`
#[derive(Debug, Clone, FromRow)]
pub struct WorkerRow {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub rate_per_square_meter: f64,
    pub phone: String,
    pub projects_assigned: Vec<String>,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Worker {
            id: row.id,
            name: row.name,
            specialization: row.specialization,
            rate_per_square_meter: row.rate_per_square_meter,
            phone: row.phone,
            projects_assigned: row.projects_assigned,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SupplierRow {
    pub id: String,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub materials: Vec<String>,
    pub user_id: Option<String>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            materials: row.materials,
            user_id: row.user_id,
        }
    }
}

const WORKER_SELECT: &str = r#"
    SELECT w.id, w.name, w.specialization, w.rate_per_square_meter, w.phone,
           ARRAY(
               SELECT p.id FROM projects p
               WHERE w.id = ANY(p.assigned_workers)
               ORDER BY p.created_at, p.id
           ) AS projects_assigned
    FROM workers w
"#;

pub(crate) async fn insert_worker_row(conn: &mut PgConnection, worker: &Worker) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO workers (id, name, specialization, rate_per_square_meter, phone)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&worker.id)
    .bind(&worker.name)
    .bind(&worker.specialization)
    .bind(worker.rate_per_square_meter)
    .bind(&worker.phone)
    .execute(conn)
    .await
    .map_err(|e| RepositoryError::from_insert(e, "worker profile"))?;
    Ok(())
}

pub(crate) async fn insert_supplier_row(
    conn: &mut PgConnection,
    supplier: &Supplier,
) -> RepositoryResult<Supplier> {
    let row = sqlx::query_as::<_, SupplierRow>(
        r#"
        INSERT INTO suppliers (id, name, contact_person, phone, email, materials, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, contact_person, phone, email, materials, user_id
        "#,
    )
    .bind(&supplier.id)
    .bind(&supplier.name)
    .bind(&supplier.contact_person)
    .bind(&supplier.phone)
    .bind(&supplier.email)
    .bind(&supplier.materials)
    .bind(&supplier.user_id)
    .fetch_one(conn)
    .await
    .map_err(|e| RepositoryError::from_insert(e, "supplier"))?;

    Ok(Supplier::from(row))
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn list_workers(&self) -> RepositoryResult<Vec<Worker>> {
        let rows = sqlx::query_as::<_, WorkerRow>(&format!("{} ORDER BY w.id", WORKER_SELECT))
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn find_worker(&self, id: &str) -> RepositoryResult<Option<Worker>> {
        let row = sqlx::query_as::<_, WorkerRow>(&format!("{} WHERE w.id = $1", WORKER_SELECT))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Worker::from))
    }

    async fn insert_worker(&self, worker: Worker) -> RepositoryResult<Worker> {
        let mut conn = self.pool().acquire().await?;
        insert_worker_row(&mut conn, &worker).await?;

        self.find_worker(&worker.id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("worker", &worker.id))
    }

    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, contact_person, phone, email, materials, user_id FROM suppliers ORDER BY id",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn insert_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier> {
        let mut conn = self.pool().acquire().await?;
        insert_supplier_row(&mut conn, &supplier).await
    }
}
