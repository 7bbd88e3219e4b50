// Auth domain routes
// 인증 도메인 라우터
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use crate::domains::auth::handlers::auth_handler;
use crate::shared::middleware::auth::{require_admin, require_session};
use crate::shared::services::AppState;

/// Create authentication router
/// 인증 라우터 생성
///
/// 공개 라우트, 세션 라우트, 관리자 라우트를 합친다.
/// Layers added later run first, so `require_session` wraps `require_admin`.
pub fn create_auth_router(state: &AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/student/email/signup", post(auth_handler::student_email_signup))
        .route("/resend-confirmation-link", post(auth_handler::resend_confirmation_link))
        .route("/confirm-email", post(auth_handler::confirm_email))
        .route("/email/login", post(auth_handler::email_login))
        .route("/email/reset-password", post(auth_handler::email_reset_password))
        .route("/email/reset-password/confirm", post(auth_handler::email_complete_reset_password))
        .route("/instructor/accept-invite", post(auth_handler::accept_instructor_invite))
        // 세션 검증 없이 토큰만 받음 (멱등)
        .route("/signout", post(auth_handler::sign_out));

    let session_routes = Router::new()
        .route("/email/change-password", patch(auth_handler::email_change_password))
        .route("/me", get(auth_handler::get_me))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let admin_routes = Router::new()
        .route("/admin/email/signup", post(auth_handler::admin_email_signup))
        .route("/admin/instructor/email-invite", post(auth_handler::instructor_send_email_invite))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
}
