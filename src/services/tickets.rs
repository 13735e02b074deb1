// Tickets service: scoped ticket lists, detail, and ticket mutations.

use std::sync::Arc;

use crate::error::ApiError;
use crate::mutation::MutationSpec;
use crate::query::{keys, QueryKey};
use crate::session::Session;
use crate::state::AppState;
use crate::types::{EntityId, NewTicket, Role, Ticket, TicketPriority, TicketStatus};

/// Which tickets a view lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketScope {
    All,
    Agent(EntityId),
}

impl TicketScope {
    /// Admins see every ticket; agents see their own.
    pub fn for_session(session: &Session) -> Result<Self, ApiError> {
        let user = session.user().filter(|_| session.is_authenticated());
        match (user, session.role()) {
            (Some(_), Some(Role::Admin)) => Ok(TicketScope::All),
            (Some(user), Some(Role::Agent)) => Ok(TicketScope::Agent(user.id.clone())),
            _ => Err(ApiError::Unauthenticated),
        }
    }

    pub fn cache_key(&self) -> QueryKey {
        match self {
            TicketScope::All => keys::tickets(),
            TicketScope::Agent(id) => keys::tickets().with("agent").with(id),
        }
    }
}

pub async fn load_tickets(state: &AppState, scope: &TicketScope) -> Result<Arc<Vec<Ticket>>, ApiError> {
    state
        .cache
        .fetch(&scope.cache_key(), move || async move {
            match scope {
                TicketScope::All => state.api.list_tickets().await,
                TicketScope::Agent(id) => state.api.list_agent_tickets(id).await,
            }
        })
        .await
}

/// Ticket detail including its conversation history.
pub async fn load_ticket(state: &AppState, id: &EntityId) -> Result<Arc<Ticket>, ApiError> {
    state
        .cache
        .fetch(&keys::ticket(id), || state.api.get_ticket(id))
        .await
}

/// Transfer a ticket to another agent.
pub async fn assign_ticket(
    state: &AppState,
    ticket_id: &EntityId,
    agent_id: Option<&EntityId>,
) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    let Some(agent_id) = agent_id.filter(|id| !id.is_empty()) else {
        return dispatcher.reject("Error", "Please select an agent");
    };

    let spec = MutationSpec::new("assign_ticket")
        .invalidates(keys::tickets())
        .invalidates(keys::ticket(ticket_id))
        .on_success("Ticket transferred successfully")
        .on_failure("Failed to transfer ticket");
    dispatcher
        .run(spec, state.api.assign_ticket(ticket_id, agent_id))
        .await
        .map(|_| ())
}

pub async fn update_ticket_status(
    state: &AppState,
    ticket_id: &EntityId,
    status: Option<TicketStatus>,
) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    let Some(status) = status else {
        return dispatcher.reject("Error", "Please select a status");
    };

    let spec = MutationSpec::new("update_ticket_status")
        .invalidates(keys::tickets())
        .invalidates(keys::ticket(ticket_id))
        .on_success("Ticket status updated successfully")
        .on_failure("Failed to update ticket status");
    dispatcher
        .run(spec, state.api.update_ticket_status(ticket_id, &status))
        .await
        .map(|_| ())
}

pub async fn update_ticket_priority(
    state: &AppState,
    ticket_id: &EntityId,
    priority: Option<TicketPriority>,
) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    let Some(priority) = priority else {
        return dispatcher.reject("Error", "Please select a priority");
    };

    let spec = MutationSpec::new("update_ticket_priority")
        .invalidates(keys::tickets())
        .invalidates(keys::ticket(ticket_id))
        .on_success("Ticket priority updated successfully")
        .on_failure("Failed to update ticket priority");
    dispatcher
        .run(spec, state.api.update_ticket_priority(ticket_id, &priority))
        .await
        .map(|_| ())
}

/// Raise a ticket for a customer. Requires an agent and a summary.
pub async fn create_ticket(state: &AppState, ticket: NewTicket) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    if ticket.user_id.is_empty() {
        return dispatcher.reject("Error", "Please select a user");
    }
    if ticket.agent_id.is_empty() {
        return dispatcher.reject("Error", "Please select an agent");
    }
    if ticket.summary.trim().is_empty() {
        return dispatcher.reject("Error", "Summary is required");
    }

    let spec = MutationSpec::new("create_ticket")
        .invalidates(keys::tickets())
        .on_success("Ticket created successfully")
        .on_failure("Failed to create ticket. Please try again.")
        .fallback_only();
    dispatcher
        .run(spec, state.api.create_ticket(&ticket))
        .await
        .map(|_| ())
}
