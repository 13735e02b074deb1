//! Agent roster.

use std::sync::Arc;

use crate::error::ApiError;
use crate::types::Agent;
use crate::util::{or_placeholder, NOT_AVAILABLE};
use crate::views::{DetailPanel, ListDetail, LoadState, Table};

pub const PROMPT: &str = "Select an agent to view details";
pub const EMPTY: &str = "No agents found.";

/// Rating out of the four-star scale, one decimal.
pub fn rating_label(agent: &Agent) -> String {
    agent
        .effective_rating()
        .map(|r| format!("{r:.1}/4"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub struct AgentsView {
    pub list: ListDetail<Agent>,
    pub state: LoadState,
}

impl Default for AgentsView {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentsView {
    pub fn new() -> Self {
        Self {
            list: ListDetail::new(PROMPT),
            state: LoadState::Loading,
        }
    }

    pub fn apply(&mut self, result: Result<Arc<Vec<Agent>>, ApiError>) {
        match result {
            Ok(agents) => {
                self.state = LoadState::loaded(agents.len(), EMPTY);
                self.list.replace_items(agents.as_ref().clone());
            }
            Err(err) => self.state = LoadState::failed("Agents", &err),
        }
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new(vec!["", "Name", "Email", "Type", "Rating"]);
        for agent in self.list.items() {
            table.push(vec![
                agent.initials(),
                agent.display_name(),
                or_placeholder(agent.email.as_deref(), NOT_AVAILABLE),
                or_placeholder(agent.ticket_type.as_ref().map(|t| t.as_str()), NOT_AVAILABLE),
                rating_label(agent),
            ]);
        }
        table
    }

    pub fn detail(&self) -> DetailPanel<'_, Agent> {
        self.list.detail()
    }
}
