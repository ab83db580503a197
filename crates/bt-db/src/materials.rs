//! Material repository
//!
//! Stock is changed through [`MaterialStore::record_movement`] only. The
//! material update and the movement insert share one transaction, and the
//! update is conditional on `lock_version` so concurrent writers never
//! overwrite each other.

use async_trait::async_trait;
use bt_models::{Material, MaterialMovement, MovementKind};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Postgres, Transaction};

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::MaterialStore;
use crate::PgStore;

/// Material database entity
#[derive(Debug, Clone, FromRow)]
pub struct MaterialRow {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub total_quantity: f64,
    pub used_quantity: f64,
    pub remaining_quantity: f64,
    pub price_per_unit: f64,
    pub supplier: String,
    pub delivery_date: Option<NaiveDate>,
    pub lock_version: i32,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Material {
            id: row.id,
            name: row.name,
            unit: row.unit,
            total_quantity: row.total_quantity,
            used_quantity: row.used_quantity,
            remaining_quantity: row.remaining_quantity,
            price_per_unit: row.price_per_unit,
            supplier: row.supplier,
            delivery_date: row.delivery_date,
            lock_version: row.lock_version,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MovementRow {
    pub id: String,
    pub material_id: String,
    pub material_name: String,
    pub project_id: String,
    pub actor_id: String,
    pub actor_name: String,
    pub kind: String,
    pub quantity: f64,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for MaterialMovement {
    type Error = RepositoryError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind = MovementKind::parse(&row.kind).ok_or_else(|| {
            RepositoryError::Validation(format!("movement {} has unknown kind {}", row.id, row.kind))
        })?;
        Ok(MaterialMovement {
            id: row.id,
            material_id: row.material_id,
            material_name: row.material_name,
            project_id: row.project_id,
            actor_id: row.actor_id,
            actor_name: row.actor_name,
            kind,
            quantity: row.quantity,
            date: row.date,
            notes: row.notes,
            cost: row.cost,
            created_at: row.created_at,
        })
    }
}

const MATERIAL_COLUMNS: &str = "id, name, unit, total_quantity, used_quantity, remaining_quantity, \
     price_per_unit, supplier, delivery_date, lock_version";

const MOVEMENT_COLUMNS: &str = "id, material_id, material_name, project_id, actor_id, actor_name, \
     kind, quantity, date, notes, cost, created_at";

impl PgStore {
    async fn apply_usage(
        tx: &mut Transaction<'_, Postgres>,
        movement: &MaterialMovement,
        expected_version: i32,
    ) -> RepositoryResult<Option<MaterialRow>> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            r#"
            UPDATE materials
            SET used_quantity = used_quantity + $3,
                remaining_quantity = remaining_quantity - $3,
                lock_version = lock_version + 1
            WHERE id = $1 AND lock_version = $2 AND remaining_quantity >= $3
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(&movement.material_id)
        .bind(expected_version)
        .bind(movement.quantity)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row)
    }

    async fn apply_delivery(
        tx: &mut Transaction<'_, Postgres>,
        movement: &MaterialMovement,
        expected_version: i32,
    ) -> RepositoryResult<Option<MaterialRow>> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            r#"
            UPDATE materials
            SET total_quantity = total_quantity + $3,
                remaining_quantity = remaining_quantity + $3,
                delivery_date = $4,
                lock_version = lock_version + 1
            WHERE id = $1 AND lock_version = $2
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(&movement.material_id)
        .bind(expected_version)
        .bind(movement.quantity)
        .bind(movement.date)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row)
    }

    /// Work out why a conditional update touched no row
    async fn rejected_movement(
        &self,
        movement: &MaterialMovement,
        expected_version: i32,
    ) -> RepositoryError {
        let current = match self.find_material(&movement.material_id).await {
            Ok(Some(material)) => material,
            Ok(None) => return RepositoryError::not_found("material", &movement.material_id),
            Err(e) => return e,
        };

        if current.lock_version != expected_version {
            RepositoryError::Conflict(format!(
                "material {} was modified concurrently",
                current.name
            ))
        } else {
            RepositoryError::InsufficientStock {
                material: current.name,
                requested: movement.quantity,
                remaining: current.remaining_quantity,
            }
        }
    }
}

#[async_trait]
impl MaterialStore for PgStore {
    async fn list_materials(&self) -> RepositoryResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {} FROM materials ORDER BY id",
            MATERIAL_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Material::from).collect())
    }

    async fn find_material(&self, id: &str) -> RepositoryResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {} FROM materials WHERE id = $1",
            MATERIAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Material::from))
    }

    async fn find_material_by_name(&self, name: &str) -> RepositoryResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {} FROM materials WHERE LOWER(name) = LOWER($1)",
            MATERIAL_COLUMNS
        ))
        .bind(name.trim())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Material::from))
    }

    async fn insert_material(&self, material: Material) -> RepositoryResult<Material> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            r#"
            INSERT INTO materials (id, name, unit, total_quantity, used_quantity, remaining_quantity,
                                   price_per_unit, supplier, delivery_date, lock_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(&material.id)
        .bind(&material.name)
        .bind(&material.unit)
        .bind(material.total_quantity)
        .bind(material.used_quantity)
        .bind(material.remaining_quantity)
        .bind(material.price_per_unit)
        .bind(&material.supplier)
        .bind(material.delivery_date)
        .bind(material.lock_version)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_insert(e, "a material with this name"))?;

        Ok(Material::from(row))
    }

    async fn record_movement(
        &self,
        movement: MaterialMovement,
        expected_version: i32,
    ) -> RepositoryResult<Material> {
        let mut tx = self.pool().begin().await?;

        let updated = match movement.kind {
            MovementKind::Usage => Self::apply_usage(&mut tx, &movement, expected_version).await?,
            MovementKind::Delivery => Self::apply_delivery(&mut tx, &movement, expected_version).await?,
        };

        let Some(row) = updated else {
            tx.rollback().await?;
            return Err(self.rejected_movement(&movement, expected_version).await);
        };

        sqlx::query(&format!(
            r#"
            INSERT INTO material_movements ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(&movement.id)
        .bind(&movement.material_id)
        .bind(&movement.material_name)
        .bind(&movement.project_id)
        .bind(&movement.actor_id)
        .bind(&movement.actor_name)
        .bind(movement.kind.as_str())
        .bind(movement.quantity)
        .bind(movement.date)
        .bind(&movement.notes)
        .bind(movement.cost)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            material_id = %row.id,
            kind = %movement.kind,
            quantity = movement.quantity,
            remaining = row.remaining_quantity,
            "Recorded material movement"
        );

        Ok(Material::from(row))
    }

    async fn list_movements(&self) -> RepositoryResult<Vec<MaterialMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {} FROM material_movements ORDER BY date DESC, created_at DESC",
            MOVEMENT_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(MaterialMovement::try_from).collect()
    }
}
