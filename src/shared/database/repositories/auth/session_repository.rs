use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domains::auth::models::session::{Session, SessionCreate};

/// Session Repository
/// 세션 데이터베이스 작업 처리
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Session {
        Session {
            id: row.get("id"),
            account_id: row.get("account_id"),
            issued_at: row.get("issued_at"),
            expires_at: row.get("expires_at"),
            revoked: row.get("revoked"),
        }
    }

    /// 세션 생성 (저장)
    /// Create and store session
    pub async fn create(&self, data: SessionCreate) -> Result<Session> {
        let row = sqlx::query(
            r#"
            INSERT INTO sessions (id, account_id, issued_at, expires_at, revoked)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id, account_id, issued_at, expires_at, revoked
            "#,
        )
        .bind(data.id)
        .bind(data.account_id)
        .bind(data.issued_at)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create session")?;

        Ok(Self::map_row(&row))
    }

    /// 세션 조회 (ID로)
    /// Find session by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, issued_at, expires_at, revoked
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find session")?;

        Ok(row.as_ref().map(Self::map_row))
    }

    /// 세션 무효화 (revoked = true)
    /// Revoke session; false when it was unknown or already revoked
    pub async fn revoke(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to revoke session")?;

        Ok(result.rows_affected() > 0)
    }

    /// 만료된 세션 무효화 (정리 작업)
    /// Revoke expired sessions (cleanup); rows are kept for auditing
    pub async fn revoke_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE
            WHERE expires_at <= $1 AND revoked = FALSE
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to revoke expired sessions")?;

        Ok(result.rows_affected())
    }
}
