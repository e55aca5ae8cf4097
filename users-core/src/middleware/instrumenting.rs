//! Prometheus instrumenting decorator

use std::time::Instant;

use async_trait::async_trait;
use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

use crate::error::CoreResult;
use crate::services::UserService;
use crate::types::{Address, Card, Health, User};

const NAMESPACE: &str = "microservices_demo";
const SUBSYSTEM: &str = "users";

/// Request counter and latency histogram, both labelled by `method`.
///
/// # Metric Specification
///
/// - `microservices_demo_users_request_count` (Counter)
/// - `microservices_demo_users_request_latency_seconds` (Histogram)
#[derive(Clone)]
pub struct ServiceMetrics {
    request_count: CounterVec,
    request_latency: HistogramVec,
}

impl ServiceMetrics {
    /// Create and register both metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let request_count = CounterVec::new(
            Opts::new("request_count", "Number of requests received.")
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM),
            &["method"],
        )?;
        let request_latency = HistogramVec::new(
            HistogramOpts::new(
                "request_latency_seconds",
                "Total duration of requests in seconds.",
            )
            .namespace(NAMESPACE)
            .subsystem(SUBSYSTEM),
            &["method"],
        )?;
        registry.register(Box::new(request_count.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;
        Ok(Self {
            request_count,
            request_latency,
        })
    }

    fn observe(&self, method: &str, begin: Instant) {
        self.request_count.with_label_values(&[method]).inc();
        self.request_latency
            .with_label_values(&[method])
            .observe(begin.elapsed().as_secs_f64());
    }

    /// Requests counted so far for `method`.
    pub fn count(&self, method: &str) -> u64 {
        // Counter values are whole numbers stored as f64.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = self.request_count.with_label_values(&[method]).get() as u64;
        count
    }
}

/// Wraps a [`UserService`] and records a count and latency per call.
pub struct InstrumentingService<S> {
    inner: S,
    metrics: ServiceMetrics,
}

impl<S: UserService> InstrumentingService<S> {
    #[must_use]
    pub fn new(inner: S, metrics: ServiceMetrics) -> Self {
        Self { inner, metrics }
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }
}

#[async_trait]
impl<S: UserService> UserService for InstrumentingService<S> {
    async fn login(&self, username: &str, password: &str) -> CoreResult<User> {
        let begin = Instant::now();
        let result = self.inner.login(username, password).await;
        self.metrics.observe("login", begin);
        result
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> CoreResult<String> {
        let begin = Instant::now();
        let result = self
            .inner
            .register(username, password, email, first_name, last_name)
            .await;
        self.metrics.observe("register", begin);
        result
    }

    async fn get_users(&self, id: &str) -> CoreResult<Vec<User>> {
        let begin = Instant::now();
        let result = self.inner.get_users(id).await;
        self.metrics.observe("getUsers", begin);
        result
    }

    async fn post_user(&self, user: User) -> CoreResult<String> {
        let begin = Instant::now();
        let result = self.inner.post_user(user).await;
        self.metrics.observe("postUser", begin);
        result
    }

    async fn get_addresses(&self, id: &str) -> CoreResult<Vec<Address>> {
        let begin = Instant::now();
        let result = self.inner.get_addresses(id).await;
        self.metrics.observe("getAddresses", begin);
        result
    }

    async fn post_address(&self, address: Address, user_id: &str) -> CoreResult<String> {
        let begin = Instant::now();
        let result = self.inner.post_address(address, user_id).await;
        self.metrics.observe("postAddress", begin);
        result
    }

    async fn get_cards(&self, id: &str) -> CoreResult<Vec<Card>> {
        let begin = Instant::now();
        let result = self.inner.get_cards(id).await;
        self.metrics.observe("getCards", begin);
        result
    }

    async fn post_card(&self, card: Card, user_id: &str) -> CoreResult<String> {
        let begin = Instant::now();
        let result = self.inner.post_card(card, user_id).await;
        self.metrics.observe("postCard", begin);
        result
    }

    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
        let begin = Instant::now();
        let result = self.inner.delete(entity, id).await;
        self.metrics.observe("delete", begin);
        result
    }

    async fn health(&self) -> Vec<Health> {
        let begin = Instant::now();
        let health = self.inner.health().await;
        self.metrics.observe("health", begin);
        health
    }
}
