use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{unwrap_data, ApiClient, ApiRequest, Method};
use crate::error::ApiError;
use crate::types::{Call, CallType, EntityId, Paged};

/// Body of `GET /api/getRecordingUrlById/{callId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingUrl {
    #[serde(default)]
    pub url: Option<String>,
}

impl ApiClient {
    /// One server page of calls. An absent type filter is sent as an empty value.
    pub async fn list_calls(
        &self,
        page: u32,
        call_type: Option<&CallType>,
    ) -> Result<Paged<Call>, ApiError> {
        let request = ApiRequest::new(Method::Get, "/api/calls")
            .query("page", page)
            .query("type", call_type.map(CallType::as_str).unwrap_or(""));
        let body = self.execute(request).await?;
        if body.is_null() {
            return Ok(Paged {
                data: Vec::new(),
                meta: Default::default(),
            });
        }
        Ok(serde_json::from_value(body)?)
    }

    /// Calls handled by one agent, unpaginated.
    pub async fn list_agent_calls(&self, agent_id: &EntityId) -> Result<Vec<Call>, ApiError> {
        self.get_list(&format!("/api/call/{agent_id}/agent")).await
    }

    pub async fn get_call(&self, id: &EntityId) -> Result<Call, ApiError> {
        let body = self.get_json(&format!("/api/call/{id}")).await?;
        Ok(serde_json::from_value(unwrap_data(body))?)
    }

    pub async fn update_call_resolution(
        &self,
        id: &EntityId,
        resolved_by_ai: bool,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Patch,
            &format!("/api/calls/{id}/status"),
            Some(json!({ "isResolvedByAi": resolved_by_ai })),
        )
        .await
    }

    /// Flip the customer-satisfied flag server side.
    pub async fn toggle_call_satisfaction(&self, id: &EntityId) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::Patch, &format!("/api/call/{id}/satisfied"), None)
            .await
    }

    pub async fn delete_call(&self, id: &EntityId) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::Delete, &format!("/api/call/{id}"), None)
            .await
    }

    pub async fn recording_url(&self, call_id: &EntityId) -> Result<RecordingUrl, ApiError> {
        let body = self
            .get_json::<serde_json::Value>(&format!("/api/getRecordingUrlById/{call_id}"))
            .await?;
        if body.is_null() {
            return Ok(RecordingUrl::default());
        }
        Ok(serde_json::from_value(body)?)
    }
}
