//! User repository
//!
//! Database operations for users.

use async_trait::async_trait;
use bt_models::user::normalize_email;
use bt_models::{Role, User, UserPreferences};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};

use crate::directory::{insert_supplier_row, insert_worker_row};
use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::{DirectoryProfile, UserStore};
use crate::PgStore;

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub password_hash: Option<String>,
    pub dark_mode: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            RepositoryError::Validation(format!("user {} has unknown role {}", row.id, row.role))
        })?;
        Ok(User {
            id: row.id,
            name: row.name,
            role,
            email: row.email,
            phone: row.phone,
            company_name: row.company_name,
            password_hash: row.password_hash,
            preferences: UserPreferences {
                dark_mode: row.dark_mode,
            },
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, name, role, email, phone, company_name, password_hash, dark_mode, created_at";

async fn insert_user_row(conn: &mut PgConnection, user: &User) -> RepositoryResult<User> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (id, name, role, email, phone, company_name, password_hash, dark_mode, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(&user.id)
    .bind(&user.name)
    .bind(user.role.as_str())
    .bind(normalize_email(&user.email))
    .bind(&user.phone)
    .bind(&user.company_name)
    .bind(&user.password_hash)
    .bind(user.preferences.dark_mode)
    .bind(user.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| RepositoryError::from_insert(e, "a user with this email"))?;

    User::try_from(row)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(self.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn count_users(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn insert_user(&self, user: User) -> RepositoryResult<User> {
        let mut conn = self.pool().acquire().await?;
        insert_user_row(&mut conn, &user).await
    }

    async fn insert_account(&self, user: User, profile: Option<DirectoryProfile>) -> RepositoryResult<User> {
        let mut tx = self.pool().begin().await?;

        let user = insert_user_row(&mut tx, &user).await?;
        match &profile {
            Some(DirectoryProfile::Worker(worker)) => insert_worker_row(&mut tx, worker).await?,
            Some(DirectoryProfile::Supplier(supplier)) => {
                insert_supplier_row(&mut tx, supplier).await?;
            }
            None => {}
        }

        tx.commit().await?;
        Ok(user)
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("user", id));
        }
        Ok(())
    }

    async fn update_preferences(&self, id: &str, preferences: UserPreferences) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET dark_mode = $2 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(preferences.dark_mode)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| RepositoryError::not_found("user", id))?;

        User::try_from(row)
    }
}
