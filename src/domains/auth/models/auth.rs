use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use crate::domains::auth::models::user::UserResponse;
use crate::shared::errors::AuthError;

/// 비밀번호 최소/최대 길이
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

// 회원가입 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = SignupRequest)]
pub struct SignupRequest {
    /// Email address
    /// 이메일 주소
    #[schema(example = "student@example.com")]
    pub email: String,

    /// Password (will be hashed)
    /// 비밀번호 (해싱됨)
    #[schema(example = "P@ssw0rd1")]
    pub password: String,
}

// 회원가입 응답 모델
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = SignupResponse)]
pub struct SignupResponse {
    /// User information (without password)
    /// 사용자 정보 (비밀번호 제외)
    pub user: UserResponse,

    /// Success message
    /// 성공 메시지
    pub message: String,
}

// 로그인 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = LoginRequest)]
pub struct LoginRequest {
    /// Email address (or username)
    /// 이메일 또는 사용자명
    #[serde(alias = "email")]
    #[schema(example = "student@example.com")]
    pub identifier: String,

    /// Password
    /// 비밀번호
    #[schema(example = "P@ssw0rd1")]
    pub password: String,
}

// 로그인 응답 모델
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = LoginResponse)]
pub struct LoginResponse {
    /// User information (without password)
    /// 사용자 정보 (비밀번호 제외)
    pub user: UserResponse,

    /// Session token (JWT, revocable)
    /// 세션 토큰
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,

    #[schema(example = "Bearer")]
    pub token_type: String,

    /// 세션 만료 시간
    /// Session expiry
    pub expires_at: DateTime<Utc>,

    /// Success message
    /// 성공 메시지
    pub message: String,
}

/// 이메일만 받는 요청 (재전송, 비밀번호 재설정, 강사 초대)
/// Email-only request body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = EmailRequest)]
pub struct EmailRequest {
    #[schema(example = "student@example.com")]
    pub email: String,
}

// 비밀번호 변경 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = ChangePasswordRequest)]
pub struct ChangePasswordRequest {
    #[schema(example = "P@ssw0rd1")]
    pub old_password: String,

    #[schema(example = "N3wP@ssw0rd")]
    pub new_password: String,
}

/// 링크 토큰 요청 (이메일 인증)
/// Link token request (email confirmation)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = LinkTokenRequest)]
pub struct LinkTokenRequest {
    #[schema(example = "k3J9x...")]
    pub token: String,
}

/// 링크 토큰 + 새 비밀번호 (재설정 완료, 초대 수락)
/// Link token with a new password (reset completion, invite acceptance)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = LinkPasswordRequest)]
pub struct LinkPasswordRequest {
    #[schema(example = "k3J9x...")]
    pub token: String,

    #[schema(example = "N3wP@ssw0rd")]
    pub password: String,
}

/// 메시지만 담는 응답
/// Message-only response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = MessageResponse)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// 이메일 형식 검증 (간단한 형태: local@domain.tld)
/// Minimal email shape check
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidInput("A valid email address is required".to_string()))
    }
}

/// 비밀번호 강도 검증
/// Password strength check: length bounds, at least one letter and one digit
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH || length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }

    if !password.chars().any(char::is_alphabetic) || !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::InvalidInput(
            "Password must contain at least one letter and one digit".to_string(),
        ));
    }

    Ok(())
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

impl LoginRequest {
    // 로그인은 형식만 확인 (강도 검사는 하지 않음)
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.identifier.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::InvalidInput("Identifier and password are required".to_string()));
        }
        Ok(())
    }
}

impl EmailRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_email(&self.email)
    }
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.old_password.is_empty() {
            return Err(AuthError::InvalidInput("Current password is required".to_string()));
        }
        validate_password(&self.new_password)
    }
}

impl LinkTokenRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.token.trim().is_empty() {
            return Err(AuthError::InvalidInput("Token is required".to_string()));
        }
        Ok(())
    }
}

impl LinkPasswordRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.token.trim().is_empty() {
            return Err(AuthError::InvalidInput("Token is required".to_string()));
        }
        validate_password(&self.password)
    }
}
