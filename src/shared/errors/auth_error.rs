use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// 인증 관련 에러
/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// 이메일이 이미 존재함
    /// Identifier already registered
    #[error("Identifier already registered: {identifier}")]
    DuplicateIdentifier { identifier: String },

    /// 사용자를 찾을 수 없음
    /// Account not found (never used where it would reveal registration)
    #[error("Account not found")]
    NotFound,

    /// 잘못된 이메일 또는 비밀번호
    /// Invalid email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// 이메일 인증이 완료되지 않음
    /// Account email not confirmed yet
    #[error("Account not confirmed")]
    AccountNotConfirmed,

    /// 이미 인증된 계정
    /// Account already confirmed
    #[error("Account already confirmed")]
    AlreadyConfirmed,

    /// 잘못된 또는 만료된 세션
    /// Invalid, expired or revoked session
    #[error("Invalid or expired session")]
    Unauthorized,

    /// 토큰이 제공되지 않음
    /// Token not provided
    #[error("Token not provided")]
    MissingToken,

    /// 링크 토큰이 만료되었거나 이미 사용됨
    /// Link token expired or already consumed
    #[error("Link token expired or already consumed")]
    ExpiredOrConsumedToken,

    /// 권한 없음 (관리자 전용)
    /// Capability check failed
    #[error("Forbidden")]
    Forbidden,

    /// 입력값 검증 실패
    /// Request validation failed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 메일 발송 실패
    /// Failed to deliver email
    #[error("Mail delivery failed: {0}")]
    MailDelivery(String),

    /// 비밀번호 해싱 실패
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    PasswordHashing(String),

    /// 데이터베이스 에러
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// 내부 서버 에러
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::DuplicateIdentifier { .. } => StatusCode::CONFLICT,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccountNotConfirmed => StatusCode::FORBIDDEN,
            AuthError::AlreadyConfirmed => StatusCode::CONFLICT,
            AuthError::Unauthorized | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::ExpiredOrConsumedToken => StatusCode::BAD_REQUEST,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::MailDelivery(_) => StatusCode::BAD_GATEWAY,
            AuthError::PasswordHashing(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에 노출해도 되는 메시지
    /// User-safe message; internal details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            AuthError::DuplicateIdentifier { .. } => {
                "An account with this email already exists".to_string()
            }
            AuthError::NotFound => "Account not found".to_string(),
            AuthError::InvalidCredentials => "Incorrect email or password".to_string(),
            AuthError::AccountNotConfirmed => "Account email has not been confirmed".to_string(),
            AuthError::AlreadyConfirmed => "Account is already confirmed".to_string(),
            AuthError::Unauthorized => "Invalid or expired session".to_string(),
            AuthError::MissingToken => "Missing or malformed authorization header".to_string(),
            AuthError::ExpiredOrConsumedToken => {
                "This link is invalid, expired or already used".to_string()
            }
            AuthError::Forbidden => "Admin privileges required".to_string(),
            AuthError::InvalidInput(message) => message.clone(),
            AuthError::MailDelivery(_) => "Failed to send email, please retry".to_string(),
            AuthError::PasswordHashing(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// AuthError를 HTTP 응답으로 변환
impl From<AuthError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: AuthError) -> Self {
        let status = err.status_code();

        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        } else {
            tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
        }

        (status, Json(json!({ "error": err.public_message() })))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body): (StatusCode, Json<serde_json::Value>) = self.into();
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AuthError::Database("connection refused on 10.0.0.4".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::DuplicateIdentifier { identifier: "a@x.com".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountNotConfirmed.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::ExpiredOrConsumedToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InvalidInput("bad".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_duplicate_message_does_not_echo_identifier() {
        let err = AuthError::DuplicateIdentifier { identifier: "a@x.com".into() };
        assert!(!err.public_message().contains("a@x.com"));
    }
}
