// Repositories module
pub mod auth;

pub use auth::*;
