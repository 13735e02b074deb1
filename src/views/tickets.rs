//! Ticket list and detail card.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ApiError;
use crate::types::{Agent, Ticket};
use crate::util::{capitalize, format_date, format_date_time, or_placeholder, status_label, NOT_AVAILABLE, UNKNOWN};
use crate::views::{DetailPanel, ListDetail, LoadState, Table};

pub const PROMPT: &str = "Select a ticket to view details";
pub const EMPTY: &str = "No tickets found.";

fn agent_name(agent: Option<&Agent>) -> String {
    agent
        .map(Agent::display_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub struct TicketsView {
    pub list: ListDetail<Ticket>,
    pub state: LoadState,
}

impl Default for TicketsView {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketsView {
    pub fn new() -> Self {
        Self {
            list: ListDetail::new(PROMPT),
            state: LoadState::Loading,
        }
    }

    /// Install a load result. A failed refresh keeps the rows already shown.
    pub fn apply(&mut self, result: Result<Arc<Vec<Ticket>>, ApiError>) {
        match result {
            Ok(tickets) => {
                self.state = LoadState::loaded(tickets.len(), EMPTY);
                self.list.replace_items(tickets.as_ref().clone());
            }
            Err(err) => self.state = LoadState::failed("Tickets", &err),
        }
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new(vec!["Sr. No", "User", "Agent", "Type", "Priority"]);
        for (i, ticket) in self.list.items().iter().enumerate() {
            let marker = if self.list.selected_id() == Some(&ticket.id) { "*" } else { "" };
            table.push(vec![
                format!("{}{}", i + 1, marker),
                or_placeholder(ticket.user.as_ref().and_then(|u| u.name.as_deref()), UNKNOWN),
                agent_name(ticket.agent.as_ref()),
                or_placeholder(ticket.ticket_type.as_ref().map(|t| t.as_str()), ""),
                or_placeholder(ticket.priority.as_ref().map(|p| p.as_str()), ""),
            ]);
        }
        table
    }

    pub fn detail(&self) -> DetailPanel<'_, Ticket> {
        self.list.detail()
    }
}

/// One call in a ticket's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    pub heading: String,
    pub exchanges: Vec<(String, String)>,
    pub summary: Option<String>,
}

/// Display-ready ticket detail with every fallback applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCard {
    pub heading: String,
    pub status: String,
    pub priority_badge: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub ticket_type: String,
    pub priority: String,
    pub rating: Option<f64>,
    pub satisfaction: &'static str,
    pub summary: String,
    pub description: Option<String>,
    pub proposed_solution: Option<String>,
    pub created: String,
    pub updated: String,
    pub agent: Option<String>,
    pub conversation: Vec<ConversationEntry>,
}

impl TicketCard {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        let user = ticket.user.as_ref();
        let conversation = ticket
            .calls
            .iter()
            .enumerate()
            .map(|(i, call)| ConversationEntry {
                heading: format!(
                    "Call {} • {}",
                    i + 1,
                    format_date_time(call.created_at.as_deref())
                ),
                exchanges: call
                    .questions_answers
                    .iter()
                    .map(|qa| {
                        (
                            or_placeholder(qa.q.as_deref(), NOT_AVAILABLE),
                            or_placeholder(qa.a.as_deref(), NOT_AVAILABLE),
                        )
                    })
                    .collect(),
                summary: call.summary.clone().filter(|s| !s.trim().is_empty()),
            })
            .collect();

        Self {
            heading: format!("Ticket #{}", ticket.id),
            status: ticket
                .status
                .as_ref()
                .map(|s| status_label(s.as_str()))
                .unwrap_or_else(|| "OPEN".to_string()),
            priority_badge: ticket
                .priority
                .as_ref()
                .map(|p| p.as_str().to_uppercase())
                .unwrap_or_else(|| "MEDIUM".to_string()),
            customer_name: or_placeholder(user.and_then(|u| u.name.as_deref()), NOT_AVAILABLE),
            customer_email: or_placeholder(user.and_then(|u| u.email.as_deref()), NOT_AVAILABLE),
            customer_phone: or_placeholder(user.and_then(|u| u.phone.as_deref()), NOT_AVAILABLE),
            ticket_type: ticket
                .ticket_type
                .as_ref()
                .map(|t| capitalize(t.as_str()))
                .unwrap_or_else(|| "General".to_string()),
            priority: ticket
                .priority
                .as_ref()
                .map(|p| capitalize(p.as_str()))
                .unwrap_or_else(|| "Medium".to_string()),
            rating: ticket.rating,
            satisfaction: match ticket.is_satisfied {
                Some(true) => "Satisfied",
                Some(false) => "Not Satisfied",
                None => "Not Rated",
            },
            summary: or_placeholder(ticket.summary.as_deref(), "No summary provided"),
            description: ticket.description.clone().filter(|d| !d.trim().is_empty()),
            proposed_solution: ticket.proposed_solution.clone().filter(|s| !s.trim().is_empty()),
            created: format_date(ticket.created_at.as_deref()),
            updated: format_date(ticket.updated_at.as_deref()),
            agent: ticket.agent.as_ref().map(|a| format!("{} {}", a.initials(), a.display_name())),
            conversation,
        }
    }

    pub fn render(&self) -> String {
        let mut out = vec![
            format!("{}  [{}] [{}]", self.heading, self.status, self.priority_badge),
            format!("Customer: {}", self.customer_name),
            format!("Email:    {}", self.customer_email),
            format!("Phone:    {}", self.customer_phone),
            format!("Type:     {}", self.ticket_type),
            format!("Priority: {}", self.priority),
            format!(
                "Rating:   {}",
                self.rating.map(|r| format!("{r:.1}")).unwrap_or_else(|| NOT_AVAILABLE.to_string())
            ),
            format!("Customer: {}", self.satisfaction),
            format!("Created:  {}", self.created),
            format!("Updated:  {}", self.updated),
        ];
        if let Some(agent) = &self.agent {
            out.push(format!("Assigned: {agent}"));
        }
        out.push(String::new());
        out.push(format!("Summary: {}", self.summary));
        if let Some(description) = &self.description {
            out.push(format!("Description: {description}"));
        }
        if let Some(solution) = &self.proposed_solution {
            out.push(format!("Proposed solution: {solution}"));
        }
        if !self.conversation.is_empty() {
            out.push(String::new());
            out.push("Conversation History".to_string());
            for entry in &self.conversation {
                out.push(format!("  {}", entry.heading));
                for (q, a) in &entry.exchanges {
                    out.push(format!("    Q: {q}"));
                    out.push(format!("    A: {a}"));
                }
                if let Some(summary) = &entry.summary {
                    out.push(format!("    Summary: {summary}"));
                }
            }
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::EntityId;

    fn tickets() -> Vec<Ticket> {
        serde_json::from_value(json!([
            {
                "id": 1,
                "status": "in_progress",
                "priority": "high",
                "ticketType": "billing",
                "User": {"id": 9, "name": "Dana Reyes", "email": "dana@example.com"},
                "Agent": {"id": 3, "firstName": "Sarah", "lastName": "Chen"},
                "createdAt": "2025-03-14T09:30:00Z",
                "Calls": [{
                    "id": 11,
                    "QuestionsAnswers": [{"q": "Why was I charged twice?", "a": "A duplicate authorization."}],
                    "summary": "Refund issued"
                }]
            },
            {"id": 2}
        ]))
        .unwrap()
    }

    #[test]
    fn test_rows_use_fallbacks() {
        let mut view = TicketsView::new();
        view.apply(Ok(Arc::new(tickets())));
        let table = view.table();
        assert_eq!(table.rows[0], vec!["1*", "Dana Reyes", "Sarah Chen", "billing", "high"]);
        assert_eq!(table.rows[1], vec!["2", "Unknown", "Unknown", "", ""]);
    }

    #[test]
    fn test_empty_collection() {
        let mut view = TicketsView::new();
        view.apply(Ok(Arc::new(Vec::new())));
        assert_eq!(view.state.message(), Some(EMPTY));
        assert_eq!(view.detail(), DetailPanel::Empty(PROMPT));
        assert!(view.table().rows.is_empty());
    }

    #[test]
    fn test_failed_refresh_keeps_rows() {
        let mut view = TicketsView::new();
        view.apply(Ok(Arc::new(tickets())));
        view.apply(Err(ApiError::Network("timed out".into())));
        assert_eq!(
            view.state.message(),
            Some("Failed to load Tickets: Network error: timed out")
        );
        assert_eq!(view.list.len(), 2);
    }

    #[test]
    fn test_deleted_ticket_leaves_rows() {
        let mut view = TicketsView::new();
        view.apply(Ok(Arc::new(tickets())));
        view.list.select(&EntityId::from(2u64));

        let remaining: Vec<Ticket> = tickets().into_iter().filter(|t| t.id.as_str() != "2").collect();
        view.apply(Ok(Arc::new(remaining)));
        assert_eq!(view.list.selected_id().map(EntityId::as_str), Some("1"));
    }

    #[test]
    fn test_card_populated() {
        let card = TicketCard::from_ticket(&tickets()[0]);
        assert_eq!(card.status, "IN PROGRESS");
        assert_eq!(card.priority_badge, "HIGH");
        assert_eq!(card.ticket_type, "Billing");
        assert_eq!(card.priority, "High");
        assert_eq!(card.customer_phone, "N/A");
        assert_eq!(card.created, "3/14/2025");
        assert_eq!(card.agent.as_deref(), Some("SC Sarah Chen"));
        assert_eq!(card.conversation[0].exchanges.len(), 1);
        assert!(card.render().contains("Conversation History"));
    }

    #[test]
    fn test_card_defaults() {
        let card = TicketCard::from_ticket(&tickets()[1]);
        assert_eq!(card.status, "OPEN");
        assert_eq!(card.priority_badge, "MEDIUM");
        assert_eq!(card.ticket_type, "General");
        assert_eq!(card.priority, "Medium");
        assert_eq!(card.customer_name, "N/A");
        assert_eq!(card.created, "N/A");
        assert_eq!(card.summary, "No summary provided");
        assert!(card.agent.is_none());
        assert!(!card.render().contains("Assigned"));
    }
}
