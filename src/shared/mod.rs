// Shared module
pub mod middleware;
pub mod clients;
pub mod config;
pub mod database;
pub mod errors;
pub mod services;

pub use middleware::*;
pub use clients::*;
pub use database::*;
pub use errors::*;
pub use services::*;
