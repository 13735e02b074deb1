use serde::Deserialize;
use serde_json::json;

use super::{ApiClient, Method};
use crate::error::ApiError;
use crate::session::SessionUser;

/// Body of `POST /api/login`. Both parts must be present for a usable session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub agent: Option<SessionUser>,
    #[serde(default)]
    pub token: Option<String>,
}

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = self
            .send_json(
                Method::Post,
                "/api/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        if body.is_null() {
            return Ok(LoginResponse::default());
        }
        Ok(serde_json::from_value(body)?)
    }
}
