use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// 사용자 역할
/// Account role, fixed at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("Unknown role: {}", other),
        }
    }
}

/// 사용자 계정 모델 (DB 저장용)
/// User account with its credential (one row per account)
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    /// 정규화된 식별자 (소문자)
    /// Normalized identifier (trimmed, lowercased)
    pub identifier: String,
    /// argon2 PHC 문자열. 초대 수락 전에는 None
    /// argon2 PHC string; None until an invited account sets its password
    pub password_hash: Option<String>,
    pub confirmed: bool,
    pub role: Role,
    pub is_course_instructor: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 계정 생성 요청 (저장소 입력)
/// Account creation input for the store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Uuid,
    pub identifier: String,
    pub password_hash: Option<String>,
    pub confirmed: bool,
    pub role: Role,
    pub is_course_instructor: bool,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    pub fn into_account(self) -> UserAccount {
        UserAccount {
            id: self.id,
            identifier: self.identifier,
            password_hash: self.password_hash,
            confirmed: self.confirmed,
            role: self.role,
            is_course_instructor: self.is_course_instructor,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// 사용자 응답 모델 (비밀번호 제외)
/// Account summary returned to clients (no credential material)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = UserResponse)]
pub struct UserResponse {
    pub id: Uuid,

    #[schema(example = "student@example.com")]
    pub email: String,

    pub role: Role,

    pub is_course_instructor: bool,

    pub confirmed: bool,

    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.identifier,
            role: account.role,
            is_course_instructor: account.is_course_instructor,
            confirmed: account.confirmed,
            created_at: account.created_at,
        }
    }
}

/// 식별자 정규화 (대소문자 무시 비교용)
/// Normalize an identifier for case-insensitive uniqueness
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}
