use serde_json::json;

use super::{ApiClient, Method};
use crate::error::ApiError;
use crate::types::{EntityId, User, UserStatus};

impl ApiClient {
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_list("/api/users").await
    }

    pub async fn update_user_status(
        &self,
        id: &EntityId,
        status: &UserStatus,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Patch,
            &format!("/api/users/{id}/status"),
            Some(json!({ "status": status })),
        )
        .await
    }

    /// Delete lives on the singular `/api/user` route.
    pub async fn delete_user(&self, id: &EntityId) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::Delete, &format!("/api/user/{id}"), None)
            .await
    }
}
