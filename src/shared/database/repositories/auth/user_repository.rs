use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;
use crate::domains::auth::models::auth_link::AuthLinkCreate;
use crate::domains::auth::models::user::{NewAccount, Role, UserAccount};
use crate::shared::database::repositories::auth::AuthLinkRepository;

const USER_COLUMNS: &str =
    "id, identifier, password_hash, confirmed, role, is_course_instructor, created_at, updated_at";

pub struct UserRepository {
    pool: PgPool
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 행 -> UserAccount 변환
    pub(crate) fn map_row(row: &PgRow) -> Result<UserAccount> {
        let role: String = row.get("role");

        Ok(UserAccount {
            id: row.get("id"),
            identifier: row.get("identifier"),
            password_hash: row.get("password_hash"),
            confirmed: row.get("confirmed"),
            role: role.parse::<Role>()?,
            is_course_instructor: row.get("is_course_instructor"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// 사용자 생성 (+ 인증/초대 링크) - 하나의 트랜잭션
    /// Create user and its first link atomically.
    /// 식별자 UNIQUE 제약이 중복 판단의 기준 (ON CONFLICT DO NOTHING)
    pub async fn create_user_with_link(
        &self,
        account: &NewAccount,
        link: Option<&AuthLinkCreate>,
    ) -> Result<Option<UserAccount>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, identifier, password_hash, confirmed, role, is_course_instructor, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (identifier) DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(account.id)
        .bind(&account.identifier)
        .bind(account.password_hash.as_deref())
        .bind(account.confirmed)
        .bind(account.role.as_str())
        .bind(account.is_course_instructor)
        .bind(account.created_at)
        .fetch_optional(&mut tx)
        .await
        .context("Failed to create user")?;

        let row = match row {
            Some(r) => r,
            None => {
                tx.rollback().await.context("Failed to roll back transaction")?;
                return Ok(None);
            }
        };

        let user = Self::map_row(&row)?;

        if let Some(link) = link {
            AuthLinkRepository::insert(&mut tx, link).await?;
        }

        tx.commit().await.context("Failed to commit user creation")?;

        Ok(Some(user))
    }

    // 식별자로 사용자 조회 (로그인용)
    // Get user by normalized identifier (for login)
    pub async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE identifier = $1",
            USER_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by identifier")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    // ID로 사용자 조회
    // Get user by ID
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by id")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// 비밀번호 변경 + 다른 세션 무효화 (트랜잭션)
    /// Password compare-and-swap plus revocation of the account's other sessions.
    /// Returns the number of revoked sessions, or None if the hash changed underneath.
    pub async fn update_password_revoking_sessions(
        &self,
        account_id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        keep_session: Option<Uuid>,
    ) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $3, updated_at = $4
            WHERE id = $1 AND password_hash = $2
            "#,
        )
        .bind(account_id)
        .bind(expected_hash)
        .bind(new_hash)
        .bind(Utc::now())
        .execute(&mut tx)
        .await
        .context("Failed to update password")?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.context("Failed to roll back transaction")?;
            return Ok(None);
        }

        // 같은 트랜잭션에서 나머지 세션 무효화
        let revoked = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE
            WHERE account_id = $1
              AND revoked = FALSE
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(account_id)
        .bind(keep_session)
        .execute(&mut tx)
        .await
        .context("Failed to revoke sessions after password change")?;

        tx.commit().await.context("Failed to commit password change")?;

        Ok(Some(revoked.rows_affected()))
    }
}
