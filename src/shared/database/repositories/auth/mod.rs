// Auth repositories
pub mod user_repository;
pub mod session_repository;
pub mod auth_link_repository;

pub use user_repository::*;
pub use session_repository::*;
pub use auth_link_repository::*;
