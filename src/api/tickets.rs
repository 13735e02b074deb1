use serde_json::json;

use super::{unwrap_data, ApiClient, Method};
use crate::error::ApiError;
use crate::types::{EntityId, NewTicket, Ticket, TicketPriority, TicketStatus};

impl ApiClient {
    /// Every ticket, for the admin queue.
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        self.get_list("/api/tickets").await
    }

    /// Tickets assigned to one agent.
    pub async fn list_agent_tickets(&self, agent_id: &EntityId) -> Result<Vec<Ticket>, ApiError> {
        self.get_list(&format!("/api/agents/{agent_id}/tickets")).await
    }

    /// Single ticket with its calls and Q/A history.
    pub async fn get_ticket(&self, id: &EntityId) -> Result<Ticket, ApiError> {
        let body = self.get_json(&format!("/api/ticket/{id}")).await?;
        Ok(serde_json::from_value(unwrap_data(body))?)
    }

    pub async fn assign_ticket(
        &self,
        id: &EntityId,
        agent_id: &EntityId,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Patch,
            &format!("/api/tickets/{id}/assign/{agent_id}"),
            None,
        )
        .await
    }

    pub async fn update_ticket_status(
        &self,
        id: &EntityId,
        status: &TicketStatus,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Patch,
            &format!("/api/tickets/{id}/status"),
            Some(json!({ "status": status })),
        )
        .await
    }

    /// The backend route is spelled `piority`.
    pub async fn update_ticket_priority(
        &self,
        id: &EntityId,
        priority: &TicketPriority,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Patch,
            &format!("/api/tickets/{id}/piority"),
            Some(json!({ "priority": priority })),
        )
        .await
    }

    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::Post,
            "/api/tickets",
            Some(serde_json::to_value(ticket)?),
        )
        .await
    }
}
