// Auth domain state
// 인증 도메인 상태
use std::sync::Arc;
use crate::domains::auth::services::{AuthService, ExpirySweeper, JwtService};
use crate::shared::clients::Mailer;
use crate::shared::config::AuthSettings;
use crate::shared::database::AuthStore;
use crate::shared::errors::AuthError;

/// Auth domain state
/// 인증 도메인에서 필요한 서비스들을 포함하는 상태
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: AuthService,
}

impl AuthState {
    /// Create AuthState with a store, a mailer and settings
    /// AuthState 생성 (저장소, 메일러, 설정 필요)
    pub fn new(
        store: Arc<dyn AuthStore>,
        mailer: Arc<dyn Mailer>,
        settings: AuthSettings,
    ) -> Result<Self, AuthError> {
        let jwt_service = JwtService::new(&settings.jwt_secret);

        Ok(Self {
            auth_service: AuthService::new(store, mailer, jwt_service, settings)?,
        })
    }

    /// 만료 정리 스케줄러 생성 (시작은 호출자가)
    /// Build the expiry sweeper for this domain
    pub fn expiry_sweeper(&self, period: std::time::Duration) -> ExpirySweeper {
        ExpirySweeper::new(self.auth_service.clone(), period)
    }
}
