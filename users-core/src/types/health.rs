//! Health probe result

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Status reported for a component that responded normally.
pub const STATUS_OK: &str = "OK";
/// Status reported for a component that failed its probe.
pub const STATUS_ERR: &str = "err";

/// Health of one probed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub service: String,
    pub status: String,
    pub time: String,
}

impl Health {
    /// Entry stamped with the current time.
    pub fn now(service: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            status: status.into(),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
