// Auth domain models
pub mod auth;
pub mod user;
pub mod jwt;
pub mod session;
pub mod auth_link;

pub use auth::*;
pub use user::*;
pub use jwt::*;
pub use session::*;
pub use auth_link::*;
