use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use crate::shared::services::AppState;
use crate::shared::errors::AuthError;

pub use crate::domains::auth::models::AuthenticatedUser;

/// Authorization 헤더에서 Bearer 토큰 추출
/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::MissingToken),
    }
}

/// 검증하지 않은 원본 Bearer 토큰
/// Raw bearer token, not validated (used by sign-out, which is idempotent)
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers).map(|token| BearerToken(token.to_owned()))
    }
}

/// 세션 가드: 유효한 세션이어야 통과
/// Session guard layer.
///
/// 토큰을 검증하고 `AuthenticatedUser`를 request extension에 넣는다.
/// Verifies the bearer token and stores the principal in the request
/// extensions for the guards and handlers that run after it.
///
/// ```rust,ignore
/// Router::new()
///     .route("/me", get(handler))
///     .route_layer(middleware::from_fn_with_state(state, require_session))
/// ```
pub async fn require_session(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?.to_owned();

    let user = app_state
        .auth_state
        .auth_service
        .authenticate(&token)
        .await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// 관리자 가드: require_session 뒤에 실행되어야 함
/// Admin capability guard; must run after `require_session`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AuthError::Unauthorized)?;

    if !user.is_admin() {
        tracing::warn!(account_id = %user.account_id, "admin route denied");
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// 가드가 넣어 둔 AuthenticatedUser 를 핸들러에서 꺼내는 Extractor
/// 가드가 없는 라우트에서 쓰면 Unauthorized
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}
