use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domains::auth::models::{
    normalize_identifier, AuthLinkCreate, AuthenticatedUser, LinkKind, LinkRedemption, NewAccount,
    Role, SessionCreate, UserAccount,
};
use crate::domains::auth::services::emails;
use crate::domains::auth::services::JwtService;
use crate::shared::clients::{Mailer, OutgoingEmail};
use crate::shared::config::AuthSettings;
use crate::shared::database::{AuthStore, SweepReport};
use crate::shared::errors::AuthError;

/// 로그인 결과
/// Successful login: the bearer token and the session's expiry
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: UserAccount,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// 인증 서비스
// AuthService: credential verification, password hashing, session issuance
// and revocation, signup and invite workflows.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AuthStore>,
    mailer: Arc<dyn Mailer>,
    jwt_service: JwtService,
    settings: Arc<AuthSettings>,
    argon2: Argon2<'static>,
    /// 존재하지 않는 계정 로그인 시 검증에 쓰는 해시
    dummy_hash: Arc<str>,
}

const DUMMY_PASSWORD: &str = "dummy-password-never-matches";

fn db_error(context: &str) -> impl FnOnce(anyhow::Error) -> AuthError + '_ {
    move |e| AuthError::Database(format!("{}: {:#}", context, e))
}

impl AuthService {
    // 생성자
    pub fn new(
        store: Arc<dyn AuthStore>,
        mailer: Arc<dyn Mailer>,
        jwt_service: JwtService,
        settings: AuthSettings,
    ) -> Result<Self, AuthError> {
        let hashing = settings.password_hashing;
        let params = Params::new(hashing.memory_kib, hashing.iterations, hashing.parallelism, None)
            .map_err(|e| AuthError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = argon2
            .hash_password(DUMMY_PASSWORD.as_bytes(), &SaltString::generate(&mut OsRng))
            .map_err(|e| AuthError::PasswordHashing(format!("Failed to prepare dummy hash: {}", e)))?
            .to_string();

        Ok(Self {
            store,
            mailer,
            jwt_service,
            settings: Arc::new(settings),
            argon2,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    // 회원가입 (비즈니스 로직)
    // Account + confirmation link are created atomically; the email is sent afterwards.
    #[tracing::instrument(skip_all, fields(role = %role))]
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        role: Role,
        is_course_instructor: bool,
    ) -> Result<UserAccount, AuthError> {
        let identifier = normalize_identifier(email);
        let password_hash = self.hash_password(password).await?;
        let now = Utc::now();

        let account = NewAccount {
            id: Uuid::new_v4(),
            identifier: identifier.clone(),
            password_hash: Some(password_hash),
            confirmed: false,
            role,
            is_course_instructor,
            created_at: now,
        };
        let token = self.jwt_service.generate_link_token();
        let link = self.new_link(account.id, &token, LinkKind::Confirm, now);

        // 1. 식별자 중복은 저장소의 UNIQUE 제약으로 판단
        let account = self
            .store
            .create_account(account, Some(link))
            .await
            .map_err(db_error("Failed to create account"))?
            .ok_or_else(|| AuthError::DuplicateIdentifier { identifier: identifier.clone() })?;

        tracing::info!(account_id = %account.id, "account created");

        // 2. 인증 메일 발송 (실패해도 계정은 유지, 재전송 API로 복구)
        let email = emails::confirmation(&account.identifier, self.link_url("auth/confirm-email", &token));
        self.deliver_best_effort(email).await;

        Ok(account)
    }

    /// 인증 링크 재전송
    /// Resend the confirmation (or pending invite) link.
    ///
    /// 가입되지 않은 식별자는 조용히 성공 처리 (계정 존재 여부 노출 방지).
    /// Unknown identifiers succeed silently so the endpoint cannot be used to
    /// enumerate accounts.
    #[tracing::instrument(skip_all)]
    pub async fn resend_confirmation_link(&self, email: &str) -> Result<(), AuthError> {
        let identifier = normalize_identifier(email);

        let account = match self
            .store
            .find_account_by_identifier(&identifier)
            .await
            .map_err(db_error("Failed to fetch account"))?
        {
            Some(account) => account,
            None => {
                tracing::debug!("confirmation resend requested for unknown identifier");
                return Ok(());
            }
        };

        if account.confirmed {
            return Err(AuthError::AlreadyConfirmed);
        }

        // 초대 수락 전 계정은 초대 링크를 다시 보냄
        let kind = if account.password_hash.is_none() {
            LinkKind::Invite
        } else {
            LinkKind::Confirm
        };

        let token = self.jwt_service.generate_link_token();
        let link = self.new_link(account.id, &token, kind, Utc::now());
        self.store
            .issue_link(link)
            .await
            .map_err(db_error("Failed to issue link"))?;

        let email = match kind {
            LinkKind::Invite => {
                emails::instructor_invite(&account.identifier, self.link_url("auth/accept-invite", &token))
            }
            _ => emails::confirmation(&account.identifier, self.link_url("auth/confirm-email", &token)),
        };
        self.deliver(email).await?;

        tracing::info!(account_id = %account.id, kind = %kind, "link re-issued");
        Ok(())
    }

    // 이메일 인증 완료
    // Consume a confirmation link: Unconfirmed -> Confirmed
    #[tracing::instrument(skip_all)]
    pub async fn confirm_email(&self, token: &str) -> Result<UserAccount, AuthError> {
        let account = self
            .redeem(
                token,
                LinkKind::Confirm,
                LinkRedemption {
                    confirm_account: true,
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(account_id = %account.id, "account confirmed");
        Ok(account)
    }

    // 로그인 (비즈니스 로직)
    // 식별자 없음 / 비밀번호 불일치는 같은 에러 (InvalidCredentials)
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let identifier = normalize_identifier(identifier);

        // 1. 식별자로 사용자 조회
        let account = self
            .store
            .find_account_by_identifier(&identifier)
            .await
            .map_err(db_error("Failed to fetch account"))?;

        // 2. 비밀번호 검증
        // 계정이 없거나 초대 수락 전(비밀번호 없음)이어도 더미 해시로 같은 비용을 치름
        let stored_hash = account.as_ref().and_then(|a| a.password_hash.clone());
        let verified = self
            .verify_password(password, stored_hash.as_deref().unwrap_or(&*self.dummy_hash))
            .await;
        let account = match account {
            Some(account) if stored_hash.is_some() => {
                verified?;
                account
            }
            _ => return Err(AuthError::InvalidCredentials),
        };

        // 3. 이메일 인증 여부 확인
        if !account.confirmed {
            return Err(AuthError::AccountNotConfirmed);
        }

        // 4. 세션 생성 및 토큰 발급
        let now = Utc::now();
        let session = self
            .store
            .create_session(SessionCreate {
                id: Uuid::new_v4(),
                account_id: account.id,
                issued_at: now,
                expires_at: now + self.settings.session_ttl,
            })
            .await
            .map_err(db_error("Failed to create session"))?;

        let token = self.jwt_service.generate_session_token(&session)?;

        tracing::info!(account_id = %account.id, session_id = %session.id, "login succeeded");

        Ok(LoginOutcome {
            account,
            token,
            expires_at: session.expires_at,
        })
    }

    /// 세션 토큰 검증
    /// Resolve a bearer token to its principal.
    ///
    /// 서명/만료 검증 후 세션 행이 살아 있는지 확인한다.
    /// Fails with `Unauthorized` when the signature, the session row or the
    /// owning account does not check out.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.jwt_service.verify_session_token(token)?;

        let session = self
            .store
            .find_session(claims.sid)
            .await
            .map_err(db_error("Failed to fetch session"))?
            .ok_or(AuthError::Unauthorized)?;

        if !session.is_active(Utc::now()) || session.account_id != claims.sub {
            return Err(AuthError::Unauthorized);
        }

        let account = self
            .store
            .find_account_by_id(session.account_id)
            .await
            .map_err(db_error("Failed to fetch account"))?
            .ok_or(AuthError::Unauthorized)?;

        Ok(AuthenticatedUser {
            account_id: account.id,
            session_id: session.id,
            identifier: account.identifier,
            role: account.role,
        })
    }

    // 비밀번호 변경
    // Re-verify the old password, store the new hash and revoke every other
    // live session of the account. The caller's session stays valid.
    #[tracing::instrument(skip_all, fields(account_id = %user.account_id))]
    pub async fn change_password(
        &self,
        user: &AuthenticatedUser,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let account = self
            .store
            .find_account_by_id(user.account_id)
            .await
            .map_err(db_error("Failed to fetch account"))?
            .ok_or(AuthError::Unauthorized)?;

        let current_hash = account
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        self.verify_password(old_password, current_hash).await?;

        let new_hash = self.hash_password(new_password).await?;

        // 동시에 비밀번호가 바뀌었다면 CAS 실패 -> 이전 비밀번호가 더 이상 맞지 않음
        let revoked = self
            .store
            .update_password(account.id, current_hash, &new_hash, Some(user.session_id))
            .await
            .map_err(db_error("Failed to update password"))?
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!(revoked_sessions = revoked, "password changed");
        Ok(())
    }

    /// 비밀번호 재설정 요청
    /// Request a password reset link.
    ///
    /// 가입 여부와 관계없이 같은 경로로 토큰을 만들고 메일을 한 통 보내며,
    /// 호출자에게는 항상 같은 성공 응답을 준다.
    /// Both branches generate a token and send exactly one email; the caller
    /// always sees the same success.
    #[tracing::instrument(skip_all)]
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let identifier = normalize_identifier(email);
        let token = self.jwt_service.generate_link_token();
        let now = Utc::now();

        let account = self
            .store
            .find_account_by_identifier(&identifier)
            .await
            .map_err(db_error("Failed to fetch account"))?;

        let email = match account {
            Some(account) => {
                let link = self.new_link(account.id, &token, LinkKind::Reset, now);
                self.store
                    .issue_link(link)
                    .await
                    .map_err(db_error("Failed to issue reset link"))?;
                emails::password_reset(&account.identifier, self.link_url("auth/reset-password", &token))
            }
            None => emails::password_reset_unknown_account(&identifier),
        };

        self.deliver(email).await
    }

    // 비밀번호 재설정 완료
    // Consume a reset link, store the new hash and revoke all sessions
    #[tracing::instrument(skip_all)]
    pub async fn complete_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<UserAccount, AuthError> {
        let new_hash = self.hash_password(new_password).await?;

        let account = self
            .redeem(
                token,
                LinkKind::Reset,
                LinkRedemption {
                    confirm_account: false,
                    new_password_hash: Some(new_hash),
                    revoke_sessions: true,
                },
            )
            .await?;

        tracing::info!(account_id = %account.id, "password reset completed");
        Ok(account)
    }

    /// 로그아웃 - 세션 무효화
    /// Sign out. Idempotent: unknown, malformed, expired or already revoked
    /// tokens are not errors.
    #[tracing::instrument(skip_all)]
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let Some(claims) = self.jwt_service.decode_ignoring_expiry(token) else {
            tracing::debug!("sign-out with unrecognized token");
            return Ok(());
        };

        let revoked = self
            .store
            .revoke_session(claims.sid)
            .await
            .map_err(db_error("Failed to revoke session"))?;

        tracing::info!(session_id = %claims.sid, revoked, "signed out");
        Ok(())
    }

    // 강사 초대 (관리자 권한은 가드에서 확인)
    // Create an invited instructor account without a password and send the invite
    #[tracing::instrument(skip_all, fields(invited_by = %admin.account_id))]
    pub async fn invite_instructor(
        &self,
        admin: &AuthenticatedUser,
        email: &str,
    ) -> Result<UserAccount, AuthError> {
        let identifier = normalize_identifier(email);
        let now = Utc::now();

        let account = NewAccount {
            id: Uuid::new_v4(),
            identifier: identifier.clone(),
            password_hash: None,
            confirmed: false,
            role: Role::Instructor,
            is_course_instructor: true,
            created_at: now,
        };
        let token = self.jwt_service.generate_link_token();
        let link = self.new_link(account.id, &token, LinkKind::Invite, now);

        let account = self
            .store
            .create_account(account, Some(link))
            .await
            .map_err(db_error("Failed to create invited account"))?
            .ok_or_else(|| AuthError::DuplicateIdentifier { identifier: identifier.clone() })?;

        tracing::info!(account_id = %account.id, "instructor invited");

        let email = emails::instructor_invite(&account.identifier, self.link_url("auth/accept-invite", &token));
        self.deliver_best_effort(email).await;

        Ok(account)
    }

    // 초대 수락: 비밀번호 설정 + 인증 완료
    // Consume an invite link, set the password and confirm the account
    #[tracing::instrument(skip_all)]
    pub async fn accept_invite(&self, token: &str, password: &str) -> Result<UserAccount, AuthError> {
        let password_hash = self.hash_password(password).await?;

        let account = self
            .redeem(
                token,
                LinkKind::Invite,
                LinkRedemption {
                    confirm_account: true,
                    new_password_hash: Some(password_hash),
                    revoke_sessions: false,
                },
            )
            .await?;

        tracing::info!(account_id = %account.id, "invite accepted");
        Ok(account)
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<UserAccount, AuthError> {
        self.store
            .find_account_by_id(account_id)
            .await
            .map_err(db_error("Failed to fetch account"))?
            .ok_or(AuthError::NotFound)
    }

    /// 최초 관리자 계정 생성 (없을 때만)
    /// Create a confirmed admin account unless the identifier is taken.
    /// Returns true when an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let identifier = normalize_identifier(email);

        if let Some(existing) = self
            .store
            .find_account_by_identifier(&identifier)
            .await
            .map_err(db_error("Failed to fetch account"))?
        {
            if existing.role != Role::Admin {
                tracing::warn!(account_id = %existing.id, "bootstrap admin identifier belongs to a non-admin account");
            }
            return Ok(false);
        }

        let account = NewAccount {
            id: Uuid::new_v4(),
            identifier,
            password_hash: Some(self.hash_password(password).await?),
            confirmed: true,
            role: Role::Admin,
            is_course_instructor: false,
            created_at: Utc::now(),
        };

        let created = self
            .store
            .create_account(account, None)
            .await
            .map_err(db_error("Failed to create admin account"))?;

        if let Some(account) = &created {
            tracing::info!(account_id = %account.id, "bootstrap admin created");
        }
        Ok(created.is_some())
    }

    /// 만료 세션/링크 정리
    /// Revoke expired sessions and delete expired links
    pub async fn sweep_expired(&self) -> Result<SweepReport, AuthError> {
        self.store
            .sweep_expired(Utc::now())
            .await
            .map_err(db_error("Failed to sweep expired records"))
    }

    async fn redeem(
        &self,
        token: &str,
        kind: LinkKind,
        redemption: LinkRedemption,
    ) -> Result<UserAccount, AuthError> {
        let token_hash = self.jwt_service.hash_link_token(token.trim());

        self.store
            .redeem_link(&token_hash, kind, Utc::now(), redemption)
            .await
            .map_err(db_error("Failed to redeem link"))?
            .ok_or(AuthError::ExpiredOrConsumedToken)
    }

    fn new_link(&self, account_id: Uuid, token: &str, kind: LinkKind, now: DateTime<Utc>) -> AuthLinkCreate {
        AuthLinkCreate {
            id: Uuid::new_v4(),
            token_hash: self.jwt_service.hash_link_token(token),
            account_id,
            kind,
            expires_at: now + self.link_ttl(kind),
            created_at: now,
        }
    }

    fn link_ttl(&self, kind: LinkKind) -> Duration {
        match kind {
            LinkKind::Confirm => self.settings.confirmation_link_ttl,
            LinkKind::Invite => self.settings.invite_link_ttl,
            LinkKind::Reset => self.settings.reset_link_ttl,
        }
    }

    fn link_url(&self, path: &str, token: &str) -> String {
        emails::action_link(&self.settings.frontend_url, path, token)
    }

    async fn deliver(&self, email: OutgoingEmail) -> Result<(), AuthError> {
        self.mailer
            .send(email)
            .await
            .map_err(|e| AuthError::MailDelivery(format!("{:#}", e)))
    }

    // 계정이 이미 저장된 뒤의 발송: 실패는 로그만 남김
    async fn deliver_best_effort(&self, email: OutgoingEmail) {
        let to = email.to.clone();
        if let Err(e) = self.deliver(email).await {
            tracing::error!(to = %to, error = %e, "failed to send email; user can request a resend");
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        // argon2 는 CPU 바운드 → blocking 풀에서 실행
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::PasswordHashing(format!("Failed to hash password: {}", e)))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<(), AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| AuthError::PasswordHashing(format!("Invalid password hash: {}", e)))?;

            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .map_err(|_| AuthError::InvalidCredentials)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))?
    }
}
