pub mod criteria;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use criteria::Criteria;
pub use manager::{connect, health_check, migrate, DatabaseError};
pub use repository::Repository;
