//! Mutation dispatch: one request, then cache invalidation and a notification.

use std::future::Future;
use std::sync::Arc;

use crate::error::ApiError;
use crate::notification::NotificationCenter;
use crate::query::{QueryCache, QueryKey};

/// What a mutation invalidates and what it tells the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSpec {
    pub name: &'static str,
    pub invalidates: Vec<QueryKey>,
    pub success_message: Option<String>,
    pub failure_message: String,
    /// Ignore the server's error text and always show `failure_message`.
    pub fallback_only: bool,
}

impl MutationSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            invalidates: Vec::new(),
            success_message: None,
            failure_message: format!("Failed to {}", name.replace('_', " ")),
            fallback_only: false,
        }
    }

    pub fn invalidates(mut self, key: QueryKey) -> Self {
        self.invalidates.push(key);
        self
    }

    pub fn on_success(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn on_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn fallback_only(mut self) -> Self {
        self.fallback_only = true;
        self
    }
}

#[derive(Clone)]
pub struct MutationDispatcher {
    cache: Arc<QueryCache>,
    notifications: Arc<NotificationCenter>,
}

impl MutationDispatcher {
    pub fn new(cache: Arc<QueryCache>, notifications: Arc<NotificationCenter>) -> Self {
        Self {
            cache,
            notifications,
        }
    }

    /// Await `request` once. Success invalidates `spec.invalidates` and queues
    /// the success message; failure queues the server's message or the
    /// fallback. Nothing is retried.
    pub async fn run<T, Fut>(&self, spec: MutationSpec, request: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match request.await {
            Ok(value) => {
                for key in &spec.invalidates {
                    self.cache.invalidate(key);
                }
                log::info!("{} succeeded", spec.name);
                if let Some(message) = spec.success_message {
                    self.notifications.success(message);
                }
                Ok(value)
            }
            Err(err) => {
                log::warn!("{} failed: {}", spec.name, err);
                let message = if spec.fallback_only {
                    spec.failure_message.clone()
                } else {
                    err.user_message(&spec.failure_message)
                };
                self.notifications.error(message);
                Err(err)
            }
        }
    }

    /// Client-side validation failure: queue the message and return without
    /// touching the API.
    pub fn reject<T>(&self, title: &str, message: impl Into<String>) -> Result<T, ApiError> {
        let message = message.into();
        log::debug!("rejected before dispatch: {message}");
        self.notifications.error_titled(title, message.clone());
        Err(ApiError::Validation(message))
    }
}
