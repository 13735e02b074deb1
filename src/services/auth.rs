// Auth service: sign in and sign out.

use crate::error::ApiError;
use crate::mutation::MutationSpec;
use crate::session::{Session, SessionUser};
use crate::state::AppState;

/// Sign in and persist the session. Any cached data from a previous
/// account is dropped first.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<SessionUser, ApiError> {
    let dispatcher = state.dispatcher();
    if email.trim().is_empty() || password.is_empty() {
        return dispatcher.reject("Error", "Please enter your email and password");
    }

    let spec = MutationSpec::new("login").on_failure("Invalid email or password");
    let session = dispatcher
        .run(spec, async {
            let resp = state.api.login(email.trim(), password).await?;
            Ok::<_, ApiError>(Session::from_login(resp.agent, resp.token)?)
        })
        .await?;

    state.cache.clear();
    let user = session.user().cloned().unwrap_or_default();
    state.set_session(session)?;
    state.notifications.success("You have successfully logged in!");
    log::info!("Signed in as {}", user.display_name());
    Ok(user)
}

/// Clear the session and every cached query.
pub fn logout(state: &AppState) -> Result<(), ApiError> {
    state.cache.clear();
    state.set_session(Session::default())?;
    state
        .notifications
        .success("You have been logged out successfully");
    log::info!("Signed out");
    Ok(())
}
