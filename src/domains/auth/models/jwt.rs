use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// JWT Claims (토큰에 포함될 데이터)
/// JWT Claims; the session row named by `sid` is the source of truth
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    /// Account ID
    pub sub: Uuid,

    /// 세션 ID
    /// Session ID
    pub sid: Uuid,

    /// 만료 시간 (Unix timestamp)
    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// 발급 시간 (Unix timestamp)
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// 세션의 만료 시간을 그대로 사용
    /// Claims mirror the session's lifetime
    pub fn new(account_id: Uuid, session_id: Uuid, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: account_id,
            sid: session_id,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        }
    }
}
