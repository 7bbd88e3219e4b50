// Database module
pub mod connection;
pub mod repositories;
pub mod store;
pub mod memory_store;

pub use connection::*;
pub use repositories::*;
pub use store::*;
pub use memory_store::*;
