// src/domains/auth/services/jwt_service.rs
use crate::shared::errors::AuthError;
use crate::domains::auth::models::jwt::Claims;
use crate::domains::auth::models::session::Session;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Sha256, Digest};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// 링크 토큰 길이
const LINK_TOKEN_LENGTH: usize = 64;

/// JWT 서비스
/// Session token signing/verification and single-use link tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// JWT Service 생성
    /// Create JWT Service
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// 세션 토큰 발급 (세션 만료 시간과 동일)
    /// Sign a bearer token for a stored session
    pub fn generate_session_token(&self, session: &Session) -> Result<String, AuthError> {
        let claims = Claims::new(session.account_id, session.id, session.issued_at, session.expires_at);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to generate session token: {}", e)))
    }

    /// 세션 토큰 검증 (서명 + 만료)
    /// Verify signature and expiry. The caller still has to check the session row.
    pub fn verify_session_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthorized)
    }

    /// 서명만 검증 (만료 무시) - 로그아웃용
    /// Verify signature only; sign-out must accept expired tokens
    pub fn decode_ignoring_expiry(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims)
    }

    /// 링크 토큰 생성 (랜덤 문자열, 메일로만 전달)
    /// Generate a link token (random string, only ever sent by email)
    pub fn generate_link_token(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(LINK_TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    /// 링크 토큰 해싱 (DB 저장용)
    /// Hash link token (for database storage)
    pub fn hash_link_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn session(ttl: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            issued_at: now,
            expires_at: now + ttl,
            revoked: false,
        }
    }

    #[test]
    fn test_session_token_round_trip() {
        let service = JwtService::new("test-secret");
        let session = session(Duration::hours(1));

        let token = service.generate_session_token(&session).unwrap();
        let claims = service.verify_session_token(&token).unwrap();

        assert_eq!(claims.sid, session.id);
        assert_eq!(claims.sub, session.account_id);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");
        let token = issuer.generate_session_token(&session(Duration::hours(1))).unwrap();

        assert!(matches!(verifier.verify_session_token(&token), Err(AuthError::Unauthorized)));
        assert!(verifier.decode_ignoring_expiry(&token).is_none());
    }

    #[test]
    fn test_expired_token_only_decodes_ignoring_expiry() {
        let service = JwtService::new("test-secret");
        let expired = session(Duration::hours(-1));
        let token = service.generate_session_token(&expired).unwrap();

        assert!(service.verify_session_token(&token).is_err());
        assert_eq!(service.decode_ignoring_expiry(&token).unwrap().sid, expired.id);
    }

    #[test]
    fn test_link_tokens() {
        let service = JwtService::new("test-secret");
        let token1 = service.generate_link_token();
        let token2 = service.generate_link_token();

        assert_eq!(token1.len(), LINK_TOKEN_LENGTH);
        assert_ne!(token1, token2);

        // SHA-256 hex = 64자, 결정적
        assert_eq!(service.hash_link_token(&token1).len(), 64);
        assert_eq!(service.hash_link_token(&token1), service.hash_link_token(&token1));
        assert_ne!(service.hash_link_token(&token1), service.hash_link_token(&token2));
    }
}
