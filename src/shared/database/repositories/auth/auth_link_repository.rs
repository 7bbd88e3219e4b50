use sqlx::{PgPool, Postgres, Row, Transaction};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domains::auth::models::auth_link::{AuthLink, AuthLinkCreate, LinkKind, LinkRedemption};
use crate::domains::auth::models::user::UserAccount;
use crate::shared::database::repositories::auth::UserRepository;

/// Auth Link Repository
/// 인증/초대/재설정 링크 데이터베이스 작업 처리
pub struct AuthLinkRepository {
    pool: PgPool,
}

impl AuthLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 트랜잭션 안에서 링크 저장
    /// Insert a link inside an existing transaction
    pub(crate) async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        link: &AuthLinkCreate,
    ) -> Result<AuthLink> {
        let row = sqlx::query(
            r#"
            INSERT INTO auth_links (id, token_hash, account_id, kind, expires_at, consumed, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING id, token_hash, account_id, kind, expires_at, consumed, created_at
            "#,
        )
        .bind(link.id)
        .bind(&link.token_hash)
        .bind(link.account_id)
        .bind(link.kind.as_str())
        .bind(link.expires_at)
        .bind(link.created_at)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create auth link")?;

        let kind: String = row.get("kind");

        Ok(AuthLink {
            id: row.get("id"),
            token_hash: row.get("token_hash"),
            account_id: row.get("account_id"),
            kind: kind.parse::<LinkKind>()?,
            expires_at: row.get("expires_at"),
            consumed: row.get("consumed"),
            created_at: row.get("created_at"),
        })
    }

    /// 새 링크 발급 (같은 종류의 이전 링크 무효화)
    /// Issue a link, invalidating the account's prior links of that kind
    pub async fn issue(&self, link: AuthLinkCreate) -> Result<AuthLink> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            UPDATE auth_links
            SET consumed = TRUE
            WHERE account_id = $1 AND kind = $2 AND consumed = FALSE
            "#,
        )
        .bind(link.account_id)
        .bind(link.kind.as_str())
        .execute(&mut tx)
        .await
        .context("Failed to invalidate previous links")?;

        let stored = Self::insert(&mut tx, &link).await?;

        tx.commit().await.context("Failed to commit link issue")?;

        Ok(stored)
    }

    /// 링크 사용 처리 + 계정 변경 (트랜잭션)
    /// Consume a link and apply the redemption to its account.
    /// 조건부 UPDATE 한 번으로 사용 처리하므로 동시에 두 번 사용될 수 없음
    pub async fn redeem(
        &self,
        token_hash: &str,
        kind: LinkKind,
        now: DateTime<Utc>,
        redemption: LinkRedemption,
    ) -> Result<Option<UserAccount>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let consumed = sqlx::query(
            r#"
            UPDATE auth_links
            SET consumed = TRUE
            WHERE token_hash = $1 AND kind = $2 AND consumed = FALSE AND expires_at > $3
            RETURNING account_id
            "#,
        )
        .bind(token_hash)
        .bind(kind.as_str())
        .bind(now)
        .fetch_optional(&mut tx)
        .await
        .context("Failed to consume auth link")?;

        let account_id: Uuid = match consumed {
            Some(row) => row.get("account_id"),
            None => {
                tx.rollback().await.context("Failed to roll back transaction")?;
                return Ok(None);
            }
        };

        let row = sqlx::query(
            r#"
            UPDATE users
            SET confirmed = confirmed OR $2,
                password_hash = COALESCE($3, password_hash),
                updated_at = $4
            WHERE id = $1
            RETURNING id, identifier, password_hash, confirmed, role, is_course_instructor, created_at, updated_at
            "#,
        )
        .bind(account_id)
        .bind(redemption.confirm_account)
        .bind(redemption.new_password_hash.as_deref())
        .bind(now)
        .fetch_one(&mut tx)
        .await
        .context("Failed to apply link redemption")?;

        let user = UserRepository::map_row(&row)?;

        if redemption.revoke_sessions {
            sqlx::query(
                r#"
                UPDATE sessions
                SET revoked = TRUE
                WHERE account_id = $1 AND revoked = FALSE
                "#,
            )
            .bind(account_id)
            .execute(&mut tx)
            .await
            .context("Failed to revoke sessions")?;
        }

        tx.commit().await.context("Failed to commit link redemption")?;

        Ok(Some(user))
    }

    /// 만료된 링크 삭제 (정리 작업)
    /// Delete expired links (cleanup)
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM auth_links
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to delete expired auth links")?;

        Ok(result.rows_affected())
    }
}
