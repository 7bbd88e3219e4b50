// =====================================================
// 인증 API 테스트
// =====================================================
// 목적: /v1/auth 라우트의 상태 코드, 가드, 응답 본문을 검증
// 서버를 띄우지 않고 Router 에 oneshot 요청
// =====================================================

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use academy_api::build_app;
use academy_api::domains::auth::handlers::RESET_PASSWORD_MESSAGE;
use common::*;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn signup(app: &Router, email: &str) -> StatusCode {
    let (status, _) = send(
        app,
        Method::POST,
        "/v1/auth/student/email/signup",
        Some(json!({ "email": email, "password": TEST_PASSWORD })),
        None,
    )
    .await;
    status
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/v1/auth/email/login",
        Some(json!({ "email": email, "password": password })),
        None,
    )
    .await
}

async fn confirmed_login(test_app: &TestApp, router: &Router, email: &str) -> String {
    assert_eq!(signup(router, email).await, StatusCode::CREATED);
    let token = link_token(&test_app.mailer.last_to(email));
    let (status, _) = send(
        router,
        Method::POST,
        "/v1/auth/confirm-email",
        Some(json!({ "token": token })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(router, email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_student_lifecycle_over_http() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());

    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/auth/student/email/signup",
        Some(json!({ "email": "Stu@Example.com", "password": TEST_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "stu@example.com");
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["confirmed"], false);
    assert!(body["user"].get("password_hash").is_none());

    // 인증 전 로그인
    let (status, body) = login(&router, "stu@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let token = link_token(&test_app.mailer.last_to("stu@example.com"));
    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/auth/confirm-email",
        Some(json!({ "token": token })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["confirmed"], true);

    let (status, body) = login(&router, "stu@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    let session = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(&router, Method::GET, "/v1/auth/me", None, Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "stu@example.com");

    let (status, body) = send(
        &router,
        Method::PATCH,
        "/v1/auth/email/change-password",
        Some(json!({ "old_password": TEST_PASSWORD, "new_password": NEW_PASSWORD })),
        Some(&session),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password Changed Successfully");

    let (status, _) = send(&router, Method::POST, "/v1/auth/signout", None, Some(&session)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, Method::GET, "/v1/auth/me", None, Some(&session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 두 번째 로그아웃도 성공
    let (status, body) = send(&router, Method::POST, "/v1/auth/signout", None, Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sign out Successful");

    let (status, _) = login(&router, "stu@example.com", NEW_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_validation_and_duplicates() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());

    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/student/email/signup",
        Some(json!({ "email": "not-an-email", "password": TEST_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/student/email/signup",
        Some(json!({ "email": "weak@example.com", "password": "short" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(signup(&router, "dup@example.com").await, StatusCode::CREATED);
    assert_eq!(signup(&router, "DUP@example.com").await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_errors_share_one_message() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());
    confirmed_login(&test_app, &router, "lee@example.com").await;

    let (status, wrong) = login(&router, "lee@example.com", "wrong-password-1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown) = login(&router, "ghost@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(wrong["error"], "Incorrect email or password");
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn test_resend_confirmation_link_statuses() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());

    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/resend-confirmation-link",
        Some(json!({ "email": "ghost@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    confirmed_login(&test_app, &router, "done@example.com").await;
    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/resend-confirmation-link",
        Some(json!({ "email": "done@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_password_response_is_uniform() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());
    let old_session = confirmed_login(&test_app, &router, "pat@example.com").await;

    let (known_status, known) = send(
        &router,
        Method::POST,
        "/v1/auth/email/reset-password",
        Some(json!({ "email": "pat@example.com" })),
        None,
    )
    .await;
    let (unknown_status, unknown) = send(
        &router,
        Method::POST,
        "/v1/auth/email/reset-password",
        Some(json!({ "email": "nobody@example.com" })),
        None,
    )
    .await;

    assert_eq!(known_status, StatusCode::CREATED);
    assert_eq!(known_status, unknown_status);
    assert_eq!(known, unknown);
    assert_eq!(known["message"], RESET_PASSWORD_MESSAGE);

    let token = link_token(&test_app.mailer.last_to("pat@example.com"));
    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/email/reset-password/confirm",
        Some(json!({ "token": token, "password": NEW_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, Method::GET, "/v1/auth/me", None, Some(&old_session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/email/reset-password/confirm",
        Some(json!({ "token": token, "password": NEW_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_guards_on_session_and_admin_routes() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());
    let student = confirmed_login(&test_app, &router, "sam@example.com").await;
    let (admin, _) = test_app.admin().await;

    // 토큰 없음
    let (status, _) = send(&router, Method::GET, "/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&router, Method::POST, "/v1/auth/signout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&router, Method::GET, "/v1/auth/me", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let invite = json!({ "email": "teacher@example.com" });
    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/admin/instructor/email-invite",
        Some(invite.clone()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/auth/admin/instructor/email-invite",
        Some(invite.clone()),
        Some(&student),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin privileges required");

    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/auth/admin/instructor/email-invite",
        Some(invite.clone()),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Instructor Invite Sent Successfully");

    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/admin/instructor/email-invite",
        Some(invite),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let new_admin = json!({ "email": "second-admin@example.com", "password": TEST_PASSWORD });
    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/admin/email/signup",
        Some(new_admin.clone()),
        Some(&student),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/auth/admin/email/signup",
        Some(new_admin),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_accept_invite_over_http() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());
    let (admin, _) = test_app.admin().await;

    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/admin/instructor/email-invite",
        Some(json!({ "email": "tina@example.com" })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let token = link_token(&test_app.mailer.last_to("tina@example.com"));
    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/auth/instructor/accept-invite",
        Some(json!({ "token": token, "password": TEST_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "instructor");
    assert_eq!(body["user"]["is_course_instructor"], true);

    let (status, body) = login(&router, "tina@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["confirmed"], true);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let test_app = TestApp::new();
    let router = build_app(test_app.state.clone());

    let (status, body) = send(&router, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/auth/email/login"].is_object());
    assert!(body["components"]["securitySchemes"]["BearerAuth"].is_object());
}
