// Domain modules
// 도메인 모듈
pub mod auth;
