//! Logging decorator
//!
//! Emits one structured `tracing` event per call after the inner service
//! returns. Passwords are never logged and card numbers only in masked form.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::services::UserService;
use crate::types::{mask_card_number, Address, Card, Health, User};

/// Wraps a [`UserService`] and logs every call.
pub struct LoggingService<S> {
    inner: S,
}

impl<S: UserService> LoggingService<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

/// `"all"` for the list-everything form of a getter.
fn who(id: &str) -> &str {
    if id.is_empty() {
        "all"
    } else {
        id
    }
}

fn log_outcome<T>(
    method: &str,
    result: &CoreResult<T>,
    took: Duration,
    summary: impl FnOnce(&T) -> String,
) {
    match result {
        Ok(value) => {
            tracing::info!(method, result = %summary(value), ?took, "call completed");
        }
        Err(e) => log_error(method, e, took),
    }
}

fn log_error(method: &str, err: &CoreError, took: Duration) {
    if err.is_expected() {
        tracing::warn!(method, error = %err, ?took, "call failed");
    } else {
        tracing::error!(method, error = %err, ?took, "call failed");
    }
}

#[async_trait]
impl<S: UserService> UserService for LoggingService<S> {
    async fn login(&self, username: &str, password: &str) -> CoreResult<User> {
        let begin = Instant::now();
        let result = self.inner.login(username, password).await;
        let span = tracing::info_span!("login", username);
        let _guard = span.enter();
        log_outcome("Login", &result, begin.elapsed(), |u| u.id.clone());
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
        let span = tracing::info_span!("register", username, email);
        let _guard = span.enter();
        log_outcome("Register", &result, begin.elapsed(), Clone::clone);
        result
    }

    async fn get_users(&self, id: &str) -> CoreResult<Vec<User>> {
        let begin = Instant::now();
        let result = self.inner.get_users(id).await;
        let span = tracing::info_span!("get_users", id = who(id));
        let _guard = span.enter();
        log_outcome("GetUsers", &result, begin.elapsed(), |u| u.len().to_string());
        result
    }

    async fn post_user(&self, user: User) -> CoreResult<String> {
        let username = user.username.clone();
        let email = user.email.clone();
        let begin = Instant::now();
        let result = self.inner.post_user(user).await;
        let span = tracing::info_span!("post_user", username = %username, email = %email);
        let _guard = span.enter();
        log_outcome("PostUser", &result, begin.elapsed(), Clone::clone);
        result
    }

    async fn get_addresses(&self, id: &str) -> CoreResult<Vec<Address>> {
        let begin = Instant::now();
        let result = self.inner.get_addresses(id).await;
        let span = tracing::info_span!("get_addresses", id = who(id));
        let _guard = span.enter();
        log_outcome("GetAddresses", &result, begin.elapsed(), |a| a.len().to_string());
        result
    }

    async fn post_address(&self, address: Address, user_id: &str) -> CoreResult<String> {
        let street = address.street.clone();
        let number = address.number.clone();
        let begin = Instant::now();
        let result = self.inner.post_address(address, user_id).await;
        let span = tracing::info_span!(
            "post_address",
            street = %street,
            number = %number,
            user = user_id
        );
        let _guard = span.enter();
        log_outcome("PostAddress", &result, begin.elapsed(), Clone::clone);
        result
    }

    async fn get_cards(&self, id: &str) -> CoreResult<Vec<Card>> {
        let begin = Instant::now();
        let result = self.inner.get_cards(id).await;
        let span = tracing::info_span!("get_cards", id = who(id));
        let _guard = span.enter();
        log_outcome("GetCards", &result, begin.elapsed(), |c| c.len().to_string());
        result
    }

    async fn post_card(&self, card: Card, user_id: &str) -> CoreResult<String> {
        let masked = mask_card_number(&card.long_num);
        let begin = Instant::now();
        let result = self.inner.post_card(card, user_id).await;
        let span = tracing::info_span!("post_card", card = %masked, user = user_id);
        let _guard = span.enter();
        log_outcome("PostCard", &result, begin.elapsed(), Clone::clone);
        result
    }

    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
        let begin = Instant::now();
        let result = self.inner.delete(entity, id).await;
        let span = tracing::info_span!("delete", entity, id);
        let _guard = span.enter();
        log_outcome("Delete", &result, begin.elapsed(), |()| "deleted".to_string());
        result
    }

    async fn health(&self) -> Vec<Health> {
        let begin = Instant::now();
        let health = self.inner.health().await;
        tracing::info!(
            method = "Health",
            result = health.len(),
            took = ?begin.elapsed(),
            "call completed"
        );
        health
    }
}
