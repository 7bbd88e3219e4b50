use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domains::auth::models::{
    AuthLink, AuthLinkCreate, LinkKind, LinkRedemption, NewAccount, Session, SessionCreate,
    UserAccount,
};
use crate::shared::database::store::{AuthStore, SweepReport};

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<Uuid, UserAccount>,
    /// 정규화된 식별자 -> 계정 ID (UNIQUE 인덱스 역할)
    identifiers: HashMap<String, Uuid>,
    sessions: HashMap<Uuid, Session>,
    /// token_hash -> link
    links: HashMap<String, AuthLink>,
}

/// 인메모리 저장소 (DATABASE_URL 미설정 시, 테스트용)
/// In-memory store used when no database is configured and in tests.
///
/// 하나의 Mutex로 모든 상태를 보호하므로 각 메서드는 원자적으로 적용된다.
/// A single lock guards all state, so every method applies atomically.
/// The lock is never held across an await point.
#[derive(Clone, Default)]
pub struct MemoryAuthStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 계정의 활성 세션 수 (테스트/디버깅용)
    /// Count live sessions for an account
    pub fn active_session_count(&self, account_id: Uuid, now: DateTime<Utc>) -> usize {
        let state = self.state.lock();
        state
            .sessions
            .values()
            .filter(|s| s.account_id == account_id && s.is_active(now))
            .count()
    }

    /// 저장된 링크 수 (테스트/디버깅용)
    pub fn link_count(&self) -> usize {
        self.state.lock().links.len()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn create_account(
        &self,
        account: NewAccount,
        link: Option<AuthLinkCreate>,
    ) -> Result<Option<UserAccount>> {
        let mut state = self.state.lock();

        if state.identifiers.contains_key(&account.identifier) {
            return Ok(None);
        }

        let account = account.into_account();
        state.identifiers.insert(account.identifier.clone(), account.id);
        state.accounts.insert(account.id, account.clone());

        if let Some(link) = link {
            let link = link.into_link();
            state.links.insert(link.token_hash.clone(), link);
        }

        Ok(Some(account))
    }

    async fn find_account_by_identifier(&self, identifier: &str) -> Result<Option<UserAccount>> {
        let state = self.state.lock();
        Ok(state
            .identifiers
            .get(identifier)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        Ok(self.state.lock().accounts.get(&id).cloned())
    }

    async fn update_password(
        &self,
        account_id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        keep_session: Option<Uuid>,
    ) -> Result<Option<u64>> {
        let mut state = self.state.lock();

        let Some(account) = state.accounts.get_mut(&account_id) else {
            return Ok(None);
        };
        if account.password_hash.as_deref() != Some(expected_hash) {
            return Ok(None);
        }
        account.password_hash = Some(new_hash.to_string());
        account.updated_at = Utc::now();

        let mut revoked = 0;
        for session in state.sessions.values_mut() {
            if session.account_id == account_id
                && !session.revoked
                && Some(session.id) != keep_session
            {
                session.revoked = true;
                revoked += 1;
            }
        }

        Ok(Some(revoked))
    }

    async fn create_session(&self, session: SessionCreate) -> Result<Session> {
        let session = session.into_session();
        self.state.lock().sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.state.lock().sessions.get(&id).cloned())
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock();
        match state.sessions.get_mut(&id) {
            Some(session) if !session.revoked => {
                session.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn issue_link(&self, link: AuthLinkCreate) -> Result<AuthLink> {
        let mut state = self.state.lock();

        for existing in state.links.values_mut() {
            if existing.account_id == link.account_id && existing.kind == link.kind {
                existing.consumed = true;
            }
        }

        let link = link.into_link();
        state.links.insert(link.token_hash.clone(), link.clone());
        Ok(link)
    }

    async fn redeem_link(
        &self,
        token_hash: &str,
        kind: LinkKind,
        now: DateTime<Utc>,
        redemption: LinkRedemption,
    ) -> Result<Option<UserAccount>> {
        let mut state = self.state.lock();

        let account_id = match state.links.get_mut(token_hash) {
            Some(link) if link.kind == kind && link.is_redeemable(now) => {
                link.consumed = true;
                link.account_id
            }
            _ => return Ok(None),
        };

        let Some(account) = state.accounts.get_mut(&account_id) else {
            anyhow::bail!("Link {} points to a missing account", token_hash);
        };
        if redemption.confirm_account {
            account.confirmed = true;
        }
        if let Some(hash) = redemption.new_password_hash {
            account.password_hash = Some(hash);
        }
        account.updated_at = now;
        let account = account.clone();

        if redemption.revoke_sessions {
            for session in state.sessions.values_mut() {
                if session.account_id == account_id {
                    session.revoked = true;
                }
            }
        }

        Ok(Some(account))
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut state = self.state.lock();

        let mut sessions_revoked = 0;
        for session in state.sessions.values_mut() {
            if !session.revoked && session.expires_at <= now {
                session.revoked = true;
                sessions_revoked += 1;
            }
        }

        let before = state.links.len();
        state.links.retain(|_, link| link.expires_at > now);
        let links_deleted = (before - state.links.len()) as u64;

        Ok(SweepReport {
            sessions_revoked,
            links_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domains::auth::models::Role;

    fn new_account(identifier: &str) -> NewAccount {
        NewAccount {
            id: Uuid::new_v4(),
            identifier: identifier.to_string(),
            password_hash: Some("hash-1".to_string()),
            confirmed: false,
            role: Role::Student,
            is_course_instructor: false,
            created_at: Utc::now(),
        }
    }

    fn link_for(account_id: Uuid, token_hash: &str, kind: LinkKind, ttl: Duration) -> AuthLinkCreate {
        let now = Utc::now();
        AuthLinkCreate {
            id: Uuid::new_v4(),
            token_hash: token_hash.to_string(),
            account_id,
            kind,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_account_is_insert_if_absent() {
        let store = MemoryAuthStore::new();

        let first = store.create_account(new_account("a@x.com"), None).await.unwrap();
        assert!(first.is_some());

        let second = store.create_account(new_account("a@x.com"), None).await.unwrap();
        assert!(second.is_none());

        let stored = store.find_account_by_identifier("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.unwrap().id);
    }

    #[tokio::test]
    async fn test_redeem_link_only_once() {
        let store = MemoryAuthStore::new();
        let account = new_account("a@x.com");
        let link = link_for(account.id, "h1", LinkKind::Confirm, Duration::hours(1));
        store.create_account(account, Some(link)).await.unwrap();

        let redemption = LinkRedemption { confirm_account: true, ..Default::default() };
        let confirmed = store
            .redeem_link("h1", LinkKind::Confirm, Utc::now(), redemption.clone())
            .await
            .unwrap()
            .unwrap();
        assert!(confirmed.confirmed);

        let again = store
            .redeem_link("h1", LinkKind::Confirm, Utc::now(), redemption)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_redeem_rejects_wrong_kind() {
        let store = MemoryAuthStore::new();
        let account = new_account("a@x.com");
        let link = link_for(account.id, "h1", LinkKind::Reset, Duration::hours(1));
        store.create_account(account, Some(link)).await.unwrap();

        let result = store
            .redeem_link("h1", LinkKind::Confirm, Utc::now(), LinkRedemption::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_issue_link_invalidates_previous() {
        let store = MemoryAuthStore::new();
        let account = new_account("a@x.com");
        let account_id = account.id;
        let first = link_for(account_id, "h1", LinkKind::Confirm, Duration::hours(1));
        store.create_account(account, Some(first)).await.unwrap();

        store
            .issue_link(link_for(account_id, "h2", LinkKind::Confirm, Duration::hours(1)))
            .await
            .unwrap();

        let old = store
            .redeem_link("h1", LinkKind::Confirm, Utc::now(), LinkRedemption::default())
            .await
            .unwrap();
        assert!(old.is_none());

        let new = store
            .redeem_link("h2", LinkKind::Confirm, Utc::now(), LinkRedemption::default())
            .await
            .unwrap();
        assert!(new.is_some());
    }

    #[tokio::test]
    async fn test_update_password_keeps_current_session() {
        let store = MemoryAuthStore::new();
        let account = store.create_account(new_account("a@x.com"), None).await.unwrap().unwrap();
        let now = Utc::now();

        let mut ids = Vec::new();
        for _ in 0..3 {
            let session = store
                .create_session(SessionCreate {
                    id: Uuid::new_v4(),
                    account_id: account.id,
                    issued_at: now,
                    expires_at: now + Duration::hours(1),
                })
                .await
                .unwrap();
            ids.push(session.id);
        }

        let revoked = store
            .update_password(account.id, "hash-1", "hash-2", Some(ids[0]))
            .await
            .unwrap();
        assert_eq!(revoked, Some(2));
        assert_eq!(store.active_session_count(account.id, now), 1);

        // 이전 해시 기준 CAS는 실패
        let stale = store
            .update_password(account.id, "hash-1", "hash-3", None)
            .await
            .unwrap();
        assert_eq!(stale, None);
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let store = MemoryAuthStore::new();
        let account = new_account("a@x.com");
        let account_id = account.id;
        let link = link_for(account_id, "h1", LinkKind::Confirm, Duration::zero());
        store.create_account(account, Some(link)).await.unwrap();

        let now = Utc::now();
        store
            .create_session(SessionCreate {
                id: Uuid::new_v4(),
                account_id,
                issued_at: now,
                expires_at: now,
            })
            .await
            .unwrap();

        let report = store.sweep_expired(now + Duration::seconds(1)).await.unwrap();
        assert_eq!(report, SweepReport { sessions_revoked: 1, links_deleted: 1 });
        assert_eq!(store.link_count(), 0);
    }
}
