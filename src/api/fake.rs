//! In-memory transport for tests: canned responses keyed by method + path.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::ApiError;

#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a response. The last queued response for a route repeats once
    /// earlier ones are consumed.
    pub(crate) fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse { status, body });
    }

    pub(crate) fn ok(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, 200, body);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = (request.method, request.path.clone());
        self.log.lock().push(request);

        let mut routes = self.routes.lock();
        match routes.get_mut(&key) {
            Some(queue) => {
                let next = if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
                next.ok_or_else(|| ApiError::Network(format!("no response for {}", key.1)))
            }
            None => Ok(ApiResponse {
                status: 404,
                body: serde_json::json!({ "error": format!("no route {} {}", key.0.as_str(), key.1) }),
            }),
        }
    }
}
