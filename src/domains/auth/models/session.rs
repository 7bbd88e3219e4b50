use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::auth::models::user::Role;

/// 세션 모델 (DB 저장용)
/// Session record backing a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl Session {
    /// 세션 유효성: 무효화되지 않았고 만료 전
    /// Active means not revoked and strictly before expires_at
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

/// 세션 생성 요청 (로그인 시)
/// Session creation input (on login)
#[derive(Debug, Clone)]
pub struct SessionCreate {
    pub id: Uuid,
    pub account_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionCreate {
    pub fn into_session(self) -> Session {
        Session {
            id: self.id,
            account_id: self.account_id,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            revoked: false,
        }
    }
}

/// 인증된 사용자 정보 (세션 토큰 검증 결과)
/// Principal resolved from a valid session token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: Uuid,
    pub session_id: Uuid,
    pub identifier: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
