//! Service decorators
//!
//! Each decorator owns an inner [`crate::services::UserService`] and
//! implements the same trait, so they stack in any order.

mod instrumenting;
mod logging;

pub use instrumenting::{InstrumentingService, ServiceMetrics};
pub use logging::LoggingService;
