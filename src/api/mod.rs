//! Typed client for the support REST API.
//!
//! Requests go through a [`Transport`] so services can be exercised without
//! a server. [`HttpTransport`] is the reqwest-backed production transport.

mod agents;
mod auth;
mod calls;
mod dashboard;
pub mod http;
mod notes;
mod tickets;
mod users;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub use agents::AgentPayload;
pub use auth::LoginResponse;
pub use calls::RecordingUrl;
pub use http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One outgoing request, relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response: status code plus the body parsed as JSON (`Null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// API client holding the transport and the current bearer token.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            token: RwLock::new(None),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// Send a request with the current token and map non-2xx to [`ApiError::Status`].
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        request.bearer = self.token.read().clone();
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await?;
        if !(200..300).contains(&response.status) {
            let server_message = extract_server_message(&response.body);
            log::warn!(
                "{} {} failed with {}: {}",
                method.as_str(),
                path,
                response.status,
                server_message.as_deref().unwrap_or("no message")
            );
            return Err(ApiError::Status {
                status: response.status,
                body: response.body.to_string(),
                server_message,
            });
        }

        Ok(response.body)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.execute(ApiRequest::new(Method::Get, path)).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub(crate) async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let body = self.execute(ApiRequest::new(Method::Get, path)).await?;
        decode_list(body)
    }

    pub(crate) async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        self.execute(request).await
    }
}

/// `error` takes precedence over `message`, as the backend uses both.
fn extract_server_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

/// Accept a bare array or an object wrapping it in `data`. Anything else
/// reads as empty, matching how the console treats a missing collection.
pub(crate) fn decode_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, ApiError> {
    match body {
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Array(_)) => Ok(serde_json::from_value(data)?),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

/// Unwrap a `{data: {...}}` envelope, or use the body as-is.
pub(crate) fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_list_shapes() {
        let bare: Vec<u32> = decode_list(json!([1, 2])).unwrap();
        assert_eq!(bare, vec![1, 2]);

        let wrapped: Vec<u32> = decode_list(json!({"data": [3]})).unwrap();
        assert_eq!(wrapped, vec![3]);

        let missing: Vec<u32> = decode_list(json!({"message": "ok"})).unwrap();
        assert!(missing.is_empty());

        let null: Vec<u32> = decode_list(Value::Null).unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn test_server_message_precedence() {
        assert_eq!(
            extract_server_message(&json!({"error": "e", "message": "m"})).as_deref(),
            Some("e")
        );
        assert_eq!(
            extract_server_message(&json!({"message": "m"})).as_deref(),
            Some("m")
        );
        assert_eq!(extract_server_message(&json!("text")), None);
    }

    #[tokio::test]
    async fn test_execute_attaches_token_and_maps_status() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(Method::Get, "/api/tickets", 403, json!({"error": "Forbidden role"}));
        let client = ApiClient::new(fake.clone());
        client.set_token(Some("tok-1".into()));

        let err = client
            .execute(ApiRequest::new(Method::Get, "/api/tickets"))
            .await
            .unwrap_err();

        assert!(err.requires_user_action());
        assert_eq!(err.server_message(), Some("Forbidden role"));
        assert_eq!(fake.requests()[0].bearer.as_deref(), Some("tok-1"));
    }
}
