use serde::Serialize;
use serde_json::json;

use super::{ApiClient, Method};
use crate::error::ApiError;
use crate::types::{Agent, EntityId, TicketType};

/// Create/update body for an agent. `password` is only sent on create.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub ticket_type: TicketType,
}

impl ApiClient {
    pub async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        self.get_list("/api/agents").await
    }

    pub async fn create_agent(&self, payload: &AgentPayload) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::Post, "/api/agents", Some(serde_json::to_value(payload)?))
            .await
    }

    pub async fn update_agent(
        &self,
        id: &EntityId,
        payload: &AgentPayload,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Put,
            &format!("/api/agents/{id}"),
            Some(serde_json::to_value(payload)?),
        )
        .await
    }

    pub async fn delete_agent(&self, id: &EntityId) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::Delete, &format!("/api/agents/{id}"), None)
            .await
    }

    /// Password change goes through the same update route with a single field.
    pub async fn update_agent_password(
        &self,
        id: &EntityId,
        password: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Put,
            &format!("/api/agents/{id}"),
            Some(json!({ "password": password })),
        )
        .await
    }
}
