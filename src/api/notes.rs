use serde::Deserialize;
use serde_json::json;

use super::{ApiClient, Method};
use crate::error::ApiError;
use crate::types::{EntityId, Note};

#[derive(Deserialize)]
struct NotesResponse {
    #[serde(default)]
    notes: Vec<Note>,
}

impl ApiClient {
    pub async fn list_notes(&self, ticket_id: &EntityId) -> Result<Vec<Note>, ApiError> {
        let body: serde_json::Value = self
            .get_json(&format!("/api/tickets/{ticket_id}/note"))
            .await?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        let resp: NotesResponse = serde_json::from_value(body)?;
        Ok(resp.notes)
    }

    pub async fn add_note(
        &self,
        ticket_id: &EntityId,
        text: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Patch,
            &format!("/api/tickets/{ticket_id}/note"),
            Some(json!({ "text": text })),
        )
        .await
    }

    pub async fn update_note(
        &self,
        ticket_id: &EntityId,
        note_id: &EntityId,
        text: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Patch,
            &format!("/api/tickets/{ticket_id}/updateNote/{note_id}"),
            Some(json!({ "text": text })),
        )
        .await
    }

    pub async fn delete_note(
        &self,
        ticket_id: &EntityId,
        note_id: &EntityId,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Delete,
            &format!("/api/tickets/{ticket_id}/note/{note_id}"),
            None,
        )
        .await
    }
}
