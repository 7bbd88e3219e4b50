// Guard middleware
pub mod auth;

pub use auth::*;
