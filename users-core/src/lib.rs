//! Users Core Library
//!
//! Provides the business logic of the users account service:
//! - Customer accounts, addresses and payment cards
//! - Password hashing and login
//! - Pluggable storage backends selected by name at startup
//! - Logging and metrics decorators around the service
//!
//! Storage is abstracted through the [`Database`] trait; transports consume
//! the [`UserService`] trait.

pub mod crypto;
pub mod error;
pub mod middleware;
pub mod services;
pub mod storage;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use middleware::{InstrumentingService, LoggingService, ServiceMetrics};
pub use services::{CoreUserService, UserService};
pub use storage::Storage;
pub use traits::{BackendRegistry, Database};
