use crate::domains::auth::models::{
    SignupRequest, SignupResponse, LoginRequest, LoginResponse, EmailRequest,
    ChangePasswordRequest, LinkTokenRequest, LinkPasswordRequest, MessageResponse,
    UserResponse, Role,
};
use crate::shared::services::AppState;
use crate::shared::errors::AuthError;
use crate::shared::middleware::auth::{AuthenticatedUser, BearerToken};
use axum::{extract::State, http::StatusCode, Json};

/// 재설정 요청 응답 (가입 여부와 무관하게 동일)
pub const RESET_PASSWORD_MESSAGE: &str =
    "If an account exists for this email, a password reset link has been sent";

// 학생 회원가입 핸들러
#[utoipa::path(
    post,
    path = "/v1/auth/student/email/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "The user has been successfully signed up", body = SignupResponse),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid email or weak password")
    ),
    tag = "Auth"
)]
pub async fn student_email_signup(
    State(app_state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AuthError> {
    request.validate()?;

    let user = app_state
        .auth_state
        .auth_service
        .signup(&request.email, &request.password, Role::Student, false)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.into(),
            message: "Signup successful, please check your email to confirm your account".to_string(),
        }),
    ))
}

// 관리자 회원가입 핸들러 (관리자 세션 필요)
#[utoipa::path(
    post,
    path = "/v1/auth/admin/email/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "The admin has been successfully signed up", body = SignupResponse),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Email already registered")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn admin_email_signup(
    State(app_state): State<AppState>,
    admin: AuthenticatedUser,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AuthError> {
    request.validate()?;

    let user = app_state
        .auth_state
        .auth_service
        .signup(&request.email, &request.password, Role::Admin, false)
        .await?;

    tracing::info!(created_by = %admin.account_id, account_id = %user.id, "admin account created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.into(),
            message: "Signup successful, please check your email to confirm your account".to_string(),
        }),
    ))
}

// 인증 링크 재전송 핸들러
#[utoipa::path(
    post,
    path = "/v1/auth/resend-confirmation-link",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "The confirmation link has been sent", body = MessageResponse),
        (status = 409, description = "Account already confirmed")
    ),
    tag = "Auth"
)]
pub async fn resend_confirmation_link(
    State(app_state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    request.validate()?;

    app_state
        .auth_state
        .auth_service
        .resend_confirmation_link(&request.email)
        .await?;

    Ok(Json(MessageResponse::new("Confirmation Link Sent Successfully")))
}

// 이메일 인증 핸들러
#[utoipa::path(
    post,
    path = "/v1/auth/confirm-email",
    request_body = LinkTokenRequest,
    responses(
        (status = 200, description = "Email confirmed", body = SignupResponse),
        (status = 400, description = "Link invalid, expired or already used")
    ),
    tag = "Auth"
)]
pub async fn confirm_email(
    State(app_state): State<AppState>,
    Json(request): Json<LinkTokenRequest>,
) -> Result<Json<SignupResponse>, AuthError> {
    request.validate()?;

    let user = app_state
        .auth_state
        .auth_service
        .confirm_email(&request.token)
        .await?;

    Ok(Json(SignupResponse {
        user: user.into(),
        message: "Email Confirmed Successfully".to_string(),
    }))
}

// 로그인 핸들러
#[utoipa::path(
    post,
    path = "/v1/auth/email/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "The user has been successfully logged in", body = LoginResponse),
        (status = 401, description = "Incorrect email or password"),
        (status = 403, description = "Account email not confirmed")
    ),
    tag = "Auth"
)]
pub async fn email_login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    request.validate()?;

    let outcome = app_state
        .auth_state
        .auth_service
        .login(&request.identifier, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        user: outcome.account.into(),
        access_token: outcome.token,
        token_type: "Bearer".to_string(),
        expires_at: outcome.expires_at,
        message: "Login successful".to_string(),
    }))
}

/// 비밀번호 변경 핸들러
/// Change password handler
#[utoipa::path(
    patch,
    path = "/v1/auth/email/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "The user password has been successfully changed", body = MessageResponse),
        (status = 401, description = "Invalid session or incorrect current password")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn email_change_password(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    request.validate()?;

    app_state
        .auth_state
        .auth_service
        .change_password(&authenticated_user, &request.old_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password Changed Successfully")))
}

/// 비밀번호 재설정 요청 핸들러
/// 응답은 계정 존재 여부와 무관하게 항상 같음
#[utoipa::path(
    post,
    path = "/v1/auth/email/reset-password",
    request_body = EmailRequest,
    responses(
        (status = 201, description = "A password reset link has been sent if the account exists", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn email_reset_password(
    State(app_state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    request.validate()?;

    app_state
        .auth_state
        .auth_service
        .reset_password(&request.email)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new(RESET_PASSWORD_MESSAGE))))
}

/// 비밀번호 재설정 완료 핸들러
#[utoipa::path(
    post,
    path = "/v1/auth/email/reset-password/confirm",
    request_body = LinkPasswordRequest,
    responses(
        (status = 200, description = "Password has been reset", body = MessageResponse),
        (status = 400, description = "Link invalid, expired or already used")
    ),
    tag = "Auth"
)]
pub async fn email_complete_reset_password(
    State(app_state): State<AppState>,
    Json(request): Json<LinkPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    request.validate()?;

    app_state
        .auth_state
        .auth_service
        .complete_password_reset(&request.token, &request.password)
        .await?;

    Ok(Json(MessageResponse::new("Password Reset Successfully")))
}

/// 로그아웃 핸들러 (멱등)
/// Sign-out handler; revoking an unknown or revoked token is not an error
#[utoipa::path(
    post,
    path = "/v1/auth/signout",
    responses(
        (status = 200, description = "The user has been successfully signed out", body = MessageResponse),
        (status = 401, description = "Missing authorization header")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn sign_out(
    State(app_state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<MessageResponse>, AuthError> {
    app_state
        .auth_state
        .auth_service
        .sign_out(&token)
        .await?;

    Ok(Json(MessageResponse::new("Sign out Successful")))
}

/// 강사 초대 핸들러 (관리자 전용)
#[utoipa::path(
    post,
    path = "/v1/auth/admin/instructor/email-invite",
    request_body = EmailRequest,
    responses(
        (status = 201, description = "Instructor Invite Sent Successfully", body = MessageResponse),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Email already registered")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn instructor_send_email_invite(
    State(app_state): State<AppState>,
    admin: AuthenticatedUser,
    Json(request): Json<EmailRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    request.validate()?;

    app_state
        .auth_state
        .auth_service
        .invite_instructor(&admin, &request.email)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Instructor Invite Sent Successfully"))))
}

/// 강사 초대 수락 핸들러
#[utoipa::path(
    post,
    path = "/v1/auth/instructor/accept-invite",
    request_body = LinkPasswordRequest,
    responses(
        (status = 200, description = "Invite accepted, account activated", body = SignupResponse),
        (status = 400, description = "Link invalid, expired or already used")
    ),
    tag = "Auth"
)]
pub async fn accept_instructor_invite(
    State(app_state): State<AppState>,
    Json(request): Json<LinkPasswordRequest>,
) -> Result<Json<SignupResponse>, AuthError> {
    request.validate()?;

    let user = app_state
        .auth_state
        .auth_service
        .accept_invite(&request.token, &request.password)
        .await?;

    Ok(Json(SignupResponse {
        user: user.into(),
        message: "Invite Accepted Successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "User info retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let user = app_state
        .auth_state
        .auth_service
        .get_account(authenticated_user.account_id)
        .await?;

    Ok(Json(user.into()))
}
