// Routes module: 라우팅 설정
// 역할: 모든 도메인의 라우터를 조합
// Routes module: combines all domain routers

use axum::Router;
use crate::shared::services::AppState;

use crate::domains::auth::routes::create_auth_router;

/// Create main router
/// 메인 라우터 생성
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new().nest("/v1/auth", create_auth_router(state))
}
