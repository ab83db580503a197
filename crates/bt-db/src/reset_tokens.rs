//! Password reset token repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::repository::RepositoryResult;
use crate::store::{PasswordResetToken, ResetTokenStore};
use crate::PgStore;

#[derive(Debug, Clone, FromRow)]
struct ResetTokenRow {
    digest: String,
    user_id: String,
    expires_at: DateTime<Utc>,
}

impl From<ResetTokenRow> for PasswordResetToken {
    fn from(row: ResetTokenRow) -> Self {
        PasswordResetToken {
            digest: row.digest,
            user_id: row.user_id,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl ResetTokenStore for PgStore {
    async fn insert_reset_token(&self, token: PasswordResetToken) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (digest, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (digest) DO UPDATE SET user_id = EXCLUDED.user_id, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&token.digest)
        .bind(&token.user_id)
        .bind(token.expires_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn take_reset_token(&self, digest: &str) -> RepositoryResult<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, ResetTokenRow>(
            "DELETE FROM password_reset_tokens WHERE digest = $1 RETURNING digest, user_id, expires_at",
        )
        .bind(digest)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(PasswordResetToken::from))
    }

    async fn delete_reset_tokens_for(&self, user_id: &str) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
