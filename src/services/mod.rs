//! Console operations. Each function takes the shared [`AppState`], reads
//! through the query cache, and sends writes through the mutation dispatcher.
//!
//! [`AppState`]: crate::state::AppState

pub mod agents;
pub mod auth;
pub mod calls;
pub mod dashboard;
pub mod notes;
pub mod tickets;
pub mod users;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::api::fake::FakeTransport;
    use crate::session::{Session, SessionUser};
    use crate::state::AppState;
    use crate::types::{Config, EntityId, Role};

    /// In-memory state signed in with `role` as account `id`.
    pub(crate) fn signed_in(role: Role, id: u64) -> (AppState, Arc<FakeTransport>) {
        let fake = Arc::new(FakeTransport::new());
        let state = AppState::new(Config::default(), fake.clone(), None);
        let session = Session::from_login(
            Some(SessionUser {
                id: EntityId::from(id),
                role: Some(role),
                first_name: Some("Test".into()),
                last_name: Some("User".into()),
                ..SessionUser::default()
            }),
            Some("tok".into()),
        )
        .unwrap();
        state.set_session(session).unwrap();
        (state, fake)
    }
}
