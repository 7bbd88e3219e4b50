use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domains::auth::models::{
    AuthLink, AuthLinkCreate, LinkKind, LinkRedemption, NewAccount, Session, SessionCreate,
    UserAccount,
};
use crate::shared::database::Database;
use crate::shared::database::repositories::{AuthLinkRepository, SessionRepository, UserRepository};

/// 만료 정리 결과
/// Result of one expiry sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions_revoked: u64,
    pub links_deleted: u64,
}

/// 계정/세션/링크 저장소
/// Account, session and link store; the sole shared resource of the service.
///
/// 여러 레코드를 건드리는 메서드는 모두 하나의 트랜잭션으로 처리되어야 한다.
/// Every method that touches more than one record must apply atomically.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// 식별자가 없을 때만 계정(+링크)을 생성. 이미 있으면 None
    /// Insert-if-absent on the identifier; `None` when it is already taken
    async fn create_account(
        &self,
        account: NewAccount,
        link: Option<AuthLinkCreate>,
    ) -> Result<Option<UserAccount>>;

    async fn find_account_by_identifier(&self, identifier: &str) -> Result<Option<UserAccount>>;

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<UserAccount>>;

    /// 저장된 해시가 `expected_hash`와 같을 때만 비밀번호 교체,
    /// `keep_session`을 제외한 모든 활성 세션 무효화.
    /// Compare-and-swap of the password hash plus revocation of every other
    /// live session. `None` when the stored hash no longer matches.
    async fn update_password(
        &self,
        account_id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        keep_session: Option<Uuid>,
    ) -> Result<Option<u64>>;

    async fn create_session(&self, session: SessionCreate) -> Result<Session>;

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>>;

    /// 세션 무효화. 이미 무효화됐거나 없으면 false
    /// Returns false when the session was unknown or already revoked
    async fn revoke_session(&self, id: Uuid) -> Result<bool>;

    /// 같은 종류의 이전 링크를 모두 무효화하고 새 링크 저장
    /// Invalidate prior unconsumed links of the same kind, then store the new one
    async fn issue_link(&self, link: AuthLinkCreate) -> Result<AuthLink>;

    /// 링크를 사용 처리하고 계정 변경사항 적용. 사용 불가 링크면 None
    /// Consume a redeemable link and apply `redemption` to its account
    async fn redeem_link(
        &self,
        token_hash: &str,
        kind: LinkKind,
        now: DateTime<Utc>,
        redemption: LinkRedemption,
    ) -> Result<Option<UserAccount>>;

    /// 만료된 세션 무효화, 만료된 링크 삭제
    /// Revoke expired sessions and delete expired links
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<SweepReport>;
}

/// PostgreSQL 저장소
/// PostgreSQL-backed store built on the repositories
#[derive(Clone)]
pub struct PgAuthStore {
    db: Database,
}

impl PgAuthStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn create_account(
        &self,
        account: NewAccount,
        link: Option<AuthLinkCreate>,
    ) -> Result<Option<UserAccount>> {
        UserRepository::new(self.db.pool().clone())
            .create_user_with_link(&account, link.as_ref())
            .await
    }

    async fn find_account_by_identifier(&self, identifier: &str) -> Result<Option<UserAccount>> {
        UserRepository::new(self.db.pool().clone())
            .get_user_by_identifier(identifier)
            .await
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        UserRepository::new(self.db.pool().clone())
            .get_user_by_id(id)
            .await
    }

    async fn update_password(
        &self,
        account_id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        keep_session: Option<Uuid>,
    ) -> Result<Option<u64>> {
        UserRepository::new(self.db.pool().clone())
            .update_password_revoking_sessions(account_id, expected_hash, new_hash, keep_session)
            .await
    }

    async fn create_session(&self, session: SessionCreate) -> Result<Session> {
        SessionRepository::new(self.db.pool().clone())
            .create(session)
            .await
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>> {
        SessionRepository::new(self.db.pool().clone())
            .find_by_id(id)
            .await
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool> {
        SessionRepository::new(self.db.pool().clone())
            .revoke(id)
            .await
    }

    async fn issue_link(&self, link: AuthLinkCreate) -> Result<AuthLink> {
        AuthLinkRepository::new(self.db.pool().clone())
            .issue(link)
            .await
    }

    async fn redeem_link(
        &self,
        token_hash: &str,
        kind: LinkKind,
        now: DateTime<Utc>,
        redemption: LinkRedemption,
    ) -> Result<Option<UserAccount>> {
        AuthLinkRepository::new(self.db.pool().clone())
            .redeem(token_hash, kind, now, redemption)
            .await
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let sessions_revoked = SessionRepository::new(self.db.pool().clone())
            .revoke_expired(now)
            .await?;
        let links_deleted = AuthLinkRepository::new(self.db.pool().clone())
            .delete_expired(now)
            .await?;

        Ok(SweepReport {
            sessions_revoked,
            links_deleted,
        })
    }
}
