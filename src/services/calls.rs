// Calls service: paged call lists, agent call history, call detail and call mutations.

use std::sync::Arc;

use crate::api::RecordingUrl;
use crate::error::ApiError;
use crate::mutation::MutationSpec;
use crate::query::{keys, QueryKey};
use crate::state::AppState;
use crate::types::{Call, CallType, EntityId, Paged};

/// Cache key for one server page: `calls/<page>/<type>`.
pub fn page_key(page: u32, call_type: Option<&CallType>) -> QueryKey {
    keys::calls()
        .with(page)
        .with(call_type.map(CallType::as_str).unwrap_or(""))
}

pub async fn load_calls_page(
    state: &AppState,
    page: u32,
    call_type: Option<&CallType>,
) -> Result<Arc<Paged<Call>>, ApiError> {
    let page = page.max(1);
    state
        .cache
        .fetch(&page_key(page, call_type), || state.api.list_calls(page, call_type))
        .await
}

/// Every call handled by one agent.
pub async fn load_agent_calls(state: &AppState, agent_id: &EntityId) -> Result<Arc<Vec<Call>>, ApiError> {
    state
        .cache
        .fetch(&keys::calls().with("agent").with(agent_id), || {
            state.api.list_agent_calls(agent_id)
        })
        .await
}

pub async fn load_call(state: &AppState, id: &EntityId) -> Result<Arc<Call>, ApiError> {
    state
        .cache
        .fetch(&keys::call(id), || state.api.get_call(id))
        .await
}

pub async fn load_recording_url(state: &AppState, call_id: &EntityId) -> Result<Arc<RecordingUrl>, ApiError> {
    state
        .cache
        .fetch(&keys::recording_url(call_id), || state.api.recording_url(call_id))
        .await
}

/// Map the AI-resolution select value to the flag the API expects.
pub fn parse_resolution(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "resolved" | "true" | "yes" => Some(true),
        "pending" | "unresolved" | "false" | "no" => Some(false),
        _ => None,
    }
}

pub async fn update_call_resolution(
    state: &AppState,
    call_id: &EntityId,
    resolved_by_ai: Option<bool>,
) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    let Some(resolved) = resolved_by_ai else {
        return dispatcher.reject("Error", "Please select a status");
    };

    let spec = MutationSpec::new("update_call_status")
        .invalidates(keys::calls())
        .invalidates(keys::call(call_id))
        .on_success("Call status updated successfully")
        .on_failure("Failed to update call status");
    dispatcher
        .run(spec, state.api.update_call_resolution(call_id, resolved))
        .await
        .map(|_| ())
}

pub async fn toggle_call_satisfaction(state: &AppState, call_id: &EntityId) -> Result<(), ApiError> {
    let spec = MutationSpec::new("toggle_call_satisfaction")
        .invalidates(keys::call(call_id))
        .invalidates(keys::calls())
        .on_success("Customer satisfaction updated")
        .on_failure("Failed to update customer satisfaction")
        .fallback_only();
    state
        .dispatcher()
        .run(spec, state.api.toggle_call_satisfaction(call_id))
        .await
        .map(|_| ())
}

pub async fn delete_call(state: &AppState, call_id: &EntityId) -> Result<(), ApiError> {
    let spec = MutationSpec::new("delete_call")
        .invalidates(keys::calls())
        .on_success("Call deleted successfully")
        .on_failure("Failed to delete call");
    state
        .dispatcher()
        .run(spec, state.api.delete_call(call_id))
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

    #[test]
    fn test_page_key() {
        assert_eq!(page_key(3, Some(&CallType::Outbound)).to_string(), "calls/3/outbound");
        assert_eq!(page_key(1, None).segments().len(), 3);
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("Resolved"), Some(true));
        assert_eq!(parse_resolution("pending"), Some(false));
        assert_eq!(parse_resolution(""), None);
    }

    #[tokio::test]
    async fn test_delete_invalidates_every_page() {
        let (state, fake) = signed_in(Role::Admin, 1);
        fake.ok(
            Method::Get,
            "/api/calls",
            json!({"data": [{"id": 1}, {"id": 2}], "meta": {"page": 1, "totalPages": 1, "total": 2}}),
        );
        fake.ok(Method::Delete, "/api/call/2", json!({}));

        load_calls_page(&state, 1, None).await.unwrap();
        load_calls_page(&state, 1, Some(&CallType::Inbound)).await.unwrap();
        assert_eq!(fake.count(Method::Get, "/api/calls"), 2);

        delete_call(&state, &EntityId::from(2u64)).await.unwrap();
        assert!(state.cache.is_stale(&page_key(1, None)));
        assert!(state.cache.is_stale(&page_key(1, Some(&CallType::Inbound))));
        assert_eq!(
            state.notifications.latest().unwrap().message,
            "Call deleted successfully"
        );
    }

    #[tokio::test]
    async fn test_toggle_satisfaction_invalidates_detail() {
        let (state, fake) = signed_in(Role::Agent, 5);
        fake.ok(Method::Get, "/api/call/8", json!({"data": {"id": 8, "customerSatisfied": false}}));
        fake.ok(Method::Patch, "/api/call/8/satisfied", json!({}));

        let id = EntityId::from(8u64);
        let call = load_call(&state, &id).await.unwrap();
        assert_eq!(call.customer_satisfied, Some(false));

        toggle_call_satisfaction(&state, &id).await.unwrap();
        assert!(state.cache.is_stale(&keys::call(&id)));
    }

    #[tokio::test]
    async fn test_missing_resolution_is_rejected() {
        let (state, fake) = signed_in(Role::Agent, 5);
        assert!(update_call_resolution(&state, &EntityId::from(1u64), None).await.is_err());
        assert!(fake.requests().is_empty());
    }
}
