// Auth domain services
pub mod auth_service;
pub mod jwt_service;
pub mod emails;
pub mod expiry_sweeper;
pub mod state;

pub use auth_service::*;
pub use jwt_service::*;
pub use expiry_sweeper::*;
pub use state::*;
