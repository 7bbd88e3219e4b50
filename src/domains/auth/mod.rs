// Auth domain: accounts, sessions, confirmation/invite/reset links
// 인증 도메인 모듈
pub mod handlers;
pub mod services;
pub mod models;
pub mod routes;

pub use routes::create_auth_router;
pub use services::{AuthService, AuthState, ExpirySweeper};
