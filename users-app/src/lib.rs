//! Application bootstrap for the Users account service.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (backend
//! registration, selection and decorator assembly), configuration loading and
//! logging setup. Transports build an `AppState` once at startup and serve
//! requests through `AppState::service`.

pub mod config;
pub mod logging;

use std::sync::Arc;
use std::time::Duration;

use prometheus::Registry;
use thiserror::Error;
use users_core::error::{CoreError, CoreResult};
use users_core::middleware::{InstrumentingService, LoggingService, ServiceMetrics};
use users_core::services::{CoreUserService, UserService};
use users_core::storage::Storage;
use users_core::traits::{BackendRegistry, Database};

use config::AppConfig;

/// Startup failure.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Application state shared by every transport handler.
pub struct AppState {
    /// Outermost decorator of the service chain
    pub service: Arc<dyn UserService>,
    /// Selected storage backend
    pub storage: Arc<Storage>,
    /// Registry holding the service metrics, if metrics are enabled
    pub metrics_registry: Option<Registry>,
}

/// Builder for constructing `AppState` from configuration.
///
/// The shipped backends are always registered. Backends added through
/// [`AppStateBuilder::backend`] are registered afterwards and replace a
/// shipped backend of the same name.
pub struct AppStateBuilder {
    config: AppConfig,
    backends: Vec<(String, Arc<dyn Database>)>,
    metrics_registry: Option<Registry>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            backends: Vec::new(),
            metrics_registry: None,
        }
    }

    #[must_use]
    pub fn backend(mut self, name: impl Into<String>, backend: Arc<dyn Database>) -> Self {
        self.backends.push((name.into(), backend));
        self
    }

    /// Register metrics here instead of a fresh registry.
    #[must_use]
    pub fn metrics_registry(mut self, registry: Registry) -> Self {
        self.metrics_registry = Some(registry);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// - `AppError::Core` if the configured backend cannot be selected
    /// - `AppError::Metrics` if the service metrics cannot be registered
    pub async fn build(self) -> Result<AppState, AppError> {
        let Self {
            config,
            backends,
            metrics_registry,
        } = self;

        let mut registry = BackendRegistry::new();
        users_store::register_backends(&mut registry, &config.store_config());
        for (name, backend) in backends {
            registry.register(name, backend);
        }

        let storage = Arc::new(
            select_with_retry(
                &registry,
                &config.database,
                &config.link_domain,
                config.startup.retry_attempts,
                config.startup.retry_delay(),
            )
            .await?,
        );

        let logged = LoggingService::new(CoreUserService::new(Arc::clone(&storage)));
        let service: Arc<dyn UserService>;
        let metrics_registry = if config.metrics.enabled {
            let registry = metrics_registry.unwrap_or_default();
            let metrics = ServiceMetrics::new(&registry)?;
            service = Arc::new(InstrumentingService::new(logged, metrics));
            Some(registry)
        } else {
            service = Arc::new(logged);
            None
        };

        tracing::info!(
            backend = %storage.backend_name(),
            link_domain = %storage.link_domain(),
            metrics = metrics_registry.is_some(),
            "Users service ready"
        );

        Ok(AppState {
            service,
            storage,
            metrics_registry,
        })
    }
}

/// Select `name` from `registry`, retrying transient failures.
///
/// Configuration errors (`NoDatabaseSelected`, `DatabaseNotRegistered`) are
/// returned at once. Other failures are retried until `attempts` tries have
/// been made, sleeping `delay` in between. At least one try is always made.
pub async fn select_with_retry(
    registry: &BackendRegistry,
    name: &str,
    link_domain: &str,
    attempts: u32,
    delay: Duration,
) -> CoreResult<Storage> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match registry.select(name, link_domain).await {
            Ok(storage) => return Ok(storage),
            Err(e) if e.is_configuration() || attempt >= attempts => {
                tracing::error!(backend = %name, attempt, error = %e, "Database selection failed");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(backend = %name, attempt, error = %e, "Database init failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
