use std::sync::Arc;
use crate::domains::auth::services::state::AuthState;
use crate::shared::clients::Mailer;
use crate::shared::config::AuthSettings;
use crate::shared::database::AuthStore;
use crate::shared::errors::AuthError;

/// Application state (combines all domain states)
/// 애플리케이션 상태 (모든 도메인 상태를 조합)
///
/// 저장소와 메일러는 트레이트 객체로 주입 → 운영(PostgreSQL)과 테스트(인메모리) 공용
#[derive(Clone)]
pub struct AppState {
    pub auth_state: AuthState,
}

impl AppState {
    /// Create AppState with a store and a mailer
    /// 모든 도메인 State를 초기화하고 조합
    pub fn new(
        store: Arc<dyn AuthStore>,
        mailer: Arc<dyn Mailer>,
        auth_settings: AuthSettings,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            auth_state: AuthState::new(store, mailer, auth_settings)?,
        })
    }
}
