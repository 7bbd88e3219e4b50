use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod domains;
pub mod shared;
pub mod routes;

use crate::domains::auth::models::*;
use crate::shared::services::AppState;

// OpenAPI 스키마 정의: Swagger 문서 자동 생성
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::domains::auth::handlers::auth_handler::student_email_signup,
        crate::domains::auth::handlers::auth_handler::admin_email_signup,
        crate::domains::auth::handlers::auth_handler::resend_confirmation_link,
        crate::domains::auth::handlers::auth_handler::confirm_email,
        crate::domains::auth::handlers::auth_handler::email_login,
        crate::domains::auth::handlers::auth_handler::email_change_password,
        crate::domains::auth::handlers::auth_handler::email_reset_password,
        crate::domains::auth::handlers::auth_handler::email_complete_reset_password,
        crate::domains::auth::handlers::auth_handler::sign_out,
        crate::domains::auth::handlers::auth_handler::instructor_send_email_invite,
        crate::domains::auth::handlers::auth_handler::accept_instructor_invite,
        crate::domains::auth::handlers::auth_handler::get_me
    ),
    components(schemas(
        Role,
        SignupRequest,
        SignupResponse,
        LoginRequest,
        LoginResponse,
        EmailRequest,
        ChangePasswordRequest,
        LinkTokenRequest,
        LinkPasswordRequest,
        MessageResponse,
        UserResponse
    )),
    modifiers(
        &SecurityAddon
    ),
    tags(
        (name = "Auth", description = "Authentication API endpoints")
    ),
    info(
        title = "Academy Auth API",
        description = "Account, session and invite management for the learning platform",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

// Security scheme 정의: Swagger UI에서 "Authorize" 버튼 추가
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// API 라우터 + Swagger UI (CORS/Trace 레이어는 main에서)
/// Application router with Swagger UI mounted at `/api`
pub fn build_app(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::create_router(&app_state))
        .merge(
            SwaggerUi::new("/api")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
        )
        .with_state(app_state)
}
