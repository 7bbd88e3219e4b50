use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 일회용 링크 종류
/// Kind of single-use link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// 회원가입 이메일 인증
    Confirm,
    /// 강사 초대
    Invite,
    /// 비밀번호 재설정
    Reset,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Confirm => "confirm",
            LinkKind::Invite => "invite",
            LinkKind::Reset => "reset",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm" => Ok(LinkKind::Confirm),
            "invite" => Ok(LinkKind::Invite),
            "reset" => Ok(LinkKind::Reset),
            other => anyhow::bail!("Unknown link kind: {}", other),
        }
    }
}

/// 일회용 링크 모델 (DB 저장용, 토큰 원문은 저장하지 않음)
/// Single-use link; only the SHA-256 of the token is stored
#[derive(Debug, Clone)]
pub struct AuthLink {
    pub id: Uuid,
    pub token_hash: String,
    pub account_id: Uuid,
    pub kind: LinkKind,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl AuthLink {
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && now < self.expires_at
    }
}

/// 링크 생성 요청
/// Link creation input
#[derive(Debug, Clone)]
pub struct AuthLinkCreate {
    pub id: Uuid,
    pub token_hash: String,
    pub account_id: Uuid,
    pub kind: LinkKind,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AuthLinkCreate {
    pub fn into_link(self) -> AuthLink {
        AuthLink {
            id: self.id,
            token_hash: self.token_hash,
            account_id: self.account_id,
            kind: self.kind,
            expires_at: self.expires_at,
            consumed: false,
            created_at: self.created_at,
        }
    }
}

/// 링크 사용 시 계정에 적용할 변경사항
/// Account changes applied in the same transaction that consumes a link
#[derive(Debug, Clone, Default)]
pub struct LinkRedemption {
    pub confirm_account: bool,
    pub new_password_hash: Option<String>,
    pub revoke_sessions: bool,
}
