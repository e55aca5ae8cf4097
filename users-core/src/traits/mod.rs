//! Storage layer abstraction trait definition

mod backend_registry;
mod database;

pub use backend_registry::BackendRegistry;
pub use database::Database;
