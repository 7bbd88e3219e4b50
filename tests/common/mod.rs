// =====================================================
// 통합 테스트 공통 헬퍼
// =====================================================
// 목적: 인메모리 저장소 + 기록용 메일러로 서비스/라우터를 구성
//
// 사용법:
// ```rust
// mod common;
// use common::*;
//
// #[tokio::test]
// async fn test_something() {
//     let app = TestApp::new();
//     // 테스트 코드...
// }
// ```
// =====================================================
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use academy_api::domains::auth::models::{AuthenticatedUser, Role, UserAccount};
use academy_api::domains::auth::services::AuthService;
use academy_api::shared::clients::{EmailKind, Mailer, OutgoingEmail};
use academy_api::shared::config::{AuthSettings, PasswordHashingSettings};
use academy_api::shared::database::MemoryAuthStore;
use academy_api::shared::services::AppState;

// 테스트용 상수
pub const TEST_PASSWORD: &str = "correct-horse-42";
pub const NEW_PASSWORD: &str = "battery-staple-77";
pub const ADMIN_EMAIL: &str = "admin@academy.test";

/// 보낸 메일을 기록하는 메일러 (fail 플래그로 발송 실패 흉내)
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<OutgoingEmail> {
        self.sent().into_iter().filter(|email| email.to == to).collect()
    }

    pub fn last_to(&self, to: &str) -> OutgoingEmail {
        self.sent_to(to).pop().expect("no email sent to address")
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mail api unavailable");
        }
        self.sent.lock().push(email);
        Ok(())
    }
}

/// 테스트 설정: 빠른 argon2 파라미터
pub fn test_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "integration-test-secret".to_string(),
        password_hashing: PasswordHashingSettings {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..AuthSettings::default()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub service: AuthService,
    pub store: MemoryAuthStore,
    pub mailer: RecordingMailer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: AuthSettings) -> Self {
        let store = MemoryAuthStore::new();
        let mailer = RecordingMailer::default();
        let state = AppState::new(Arc::new(store.clone()), Arc::new(mailer.clone()), settings)
            .expect("Failed to initialize AppState");
        let service = state.auth_state.auth_service.clone();

        Self { state, service, store, mailer }
    }

    /// 가입 + 메일 링크로 인증까지 완료
    pub async fn confirmed_student(&self, email: &str) -> UserAccount {
        let account = self
            .service
            .signup(email, TEST_PASSWORD, Role::Student, false)
            .await
            .expect("signup failed");
        let token = link_token(&self.mailer.last_to(&account.identifier));
        self.service.confirm_email(&token).await.expect("confirm failed")
    }

    /// 로그인 후 세션 토큰 반환
    pub async fn login(&self, email: &str, password: &str) -> String {
        self.service.login(email, password).await.expect("login failed").token
    }

    /// 부트스트랩 관리자 생성 + 로그인
    pub async fn admin(&self) -> (String, AuthenticatedUser) {
        self.service
            .ensure_admin(ADMIN_EMAIL, TEST_PASSWORD)
            .await
            .expect("ensure_admin failed");
        let token = self.login(ADMIN_EMAIL, TEST_PASSWORD).await;
        let user = self.service.authenticate(&token).await.expect("admin session invalid");
        (token, user)
    }
}

/// 메일의 action_url 에서 token 쿼리 추출
pub fn link_token(email: &OutgoingEmail) -> String {
    let url = email.action_url.as_deref().expect("email has no link");
    Url::parse(url)
        .expect("invalid link")
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .expect("link has no token")
}

pub fn count_kind(emails: &[OutgoingEmail], kind: EmailKind) -> usize {
    emails.iter().filter(|email| email.kind == kind).count()
}
