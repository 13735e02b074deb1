// Notes service: per-ticket notes with add, edit and delete.

use std::sync::Arc;

use crate::error::ApiError;
use crate::mutation::MutationSpec;
use crate::query::keys;
use crate::state::AppState;
use crate::types::{EntityId, Note};

const MAX_NOTE_LEN: usize = 2000;

pub async fn load_notes(state: &AppState, ticket_id: &EntityId) -> Result<Arc<Vec<Note>>, ApiError> {
    state
        .cache
        .fetch(&keys::ticket_notes(ticket_id), || state.api.list_notes(ticket_id))
        .await
}

fn note_text(state: &AppState, text: &str) -> Result<String, ApiError> {
    crate::util::validate_bounded_string(text, "Note text", MAX_NOTE_LEN)
        .or_else(|message| state.dispatcher().reject("Error", message))
}

pub async fn add_note(state: &AppState, ticket_id: &EntityId, text: &str) -> Result<(), ApiError> {
    let text = note_text(state, text)?;
    let spec = MutationSpec::new("add_note")
        .invalidates(keys::ticket_notes(ticket_id))
        .on_success("Note added successfully")
        .on_failure("Failed to add note");
    state
        .dispatcher()
        .run(spec, state.api.add_note(ticket_id, &text))
        .await
        .map(|_| ())
}

pub async fn update_note(
    state: &AppState,
    ticket_id: &EntityId,
    note_id: &EntityId,
    text: &str,
) -> Result<(), ApiError> {
    let text = note_text(state, text)?;
    let spec = MutationSpec::new("update_note")
        .invalidates(keys::ticket_notes(ticket_id))
        .on_success("Note updated successfully")
        .on_failure("Failed to update note");
    state
        .dispatcher()
        .run(spec, state.api.update_note(ticket_id, note_id, &text))
        .await
        .map(|_| ())
}

pub async fn delete_note(
    state: &AppState,
    ticket_id: &EntityId,
    note_id: &EntityId,
) -> Result<(), ApiError> {
    let spec = MutationSpec::new("delete_note")
        .invalidates(keys::ticket_notes(ticket_id))
        .on_success("Note deleted successfully")
        .on_failure("Failed to delete note");
    state
        .dispatcher()
        .run(spec, state.api.delete_note(ticket_id, note_id))
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::Method;
    use crate::services::testing::signed_in;
    use crate::types::Role;

    #[tokio::test]
    async fn test_blank_note_is_rejected() {
        let (state, fake) = signed_in(Role::Agent, 2);
        let err = add_note(&state, &EntityId::from(1u64), "   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_add_note_trims_and_invalidates_only_that_ticket() {
        let (state, fake) = signed_in(Role::Agent, 2);
        fake.ok(Method::Get, "/api/tickets/1/note", json!({"notes": []}));
        fake.ok(Method::Get, "/api/tickets/2/note", json!({"notes": []}));
        fake.ok(Method::Patch, "/api/tickets/1/note", json!({}));

        let one = EntityId::from(1u64);
        let two = EntityId::from(2u64);
        load_notes(&state, &one).await.unwrap();
        load_notes(&state, &two).await.unwrap();

        add_note(&state, &one, "  call back after 3pm ").await.unwrap();
        let sent = fake
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Patch)
            .unwrap();
        assert_eq!(sent.body, Some(json!({"text": "call back after 3pm"})));
        assert!(state.cache.is_stale(&keys::ticket_notes(&one)));
        assert!(!state.cache.is_stale(&keys::ticket_notes(&two)));
    }
}
