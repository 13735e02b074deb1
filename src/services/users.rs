// Users service: customer list, status changes, and deletion.

use std::sync::Arc;

use crate::error::ApiError;
use crate::mutation::MutationSpec;
use crate::query::keys;
use crate::state::AppState;
use crate::types::{EntityId, User, UserStatus};

pub async fn load_users(state: &AppState) -> Result<Arc<Vec<User>>, ApiError> {
    state
        .cache
        .fetch(&keys::users(), || state.api.list_users())
        .await
}

pub async fn update_user_status(
    state: &AppState,
    user_id: &EntityId,
    status: Option<UserStatus>,
) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    let Some(status) = status else {
        return dispatcher.reject("Error", "Please select a status");
    };

    let spec = MutationSpec::new("update_user_status")
        .invalidates(keys::users())
        .on_success("User status updated successfully")
        .on_failure("Failed to update user status");
    dispatcher
        .run(spec, state.api.update_user_status(user_id, &status))
        .await
        .map(|_| ())
}

pub async fn delete_user(state: &AppState, user_id: &EntityId) -> Result<(), ApiError> {
    let spec = MutationSpec::new("delete_user")
        .invalidates(keys::users())
        .on_success("User deleted successfully")
        .on_failure("Failed to delete user");
    state
        .dispatcher()
        .run(spec, state.api.delete_user(user_id))
        .await
        .map(|_| ())
}
