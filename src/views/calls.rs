//! Call lists: the admin server-paged list, an agent's call history and the
//! agent outbound page with category tabs.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ApiError;
use crate::types::{Call, CallCategory, CallType, Paged};
use crate::util::{format_date, or_placeholder, NOT_AVAILABLE};
use crate::views::{ClientPager, DetailPanel, ListDetail, LoadState, ServerPager, Table};

pub const PROMPT: &str = "Select a call to view details";
pub const EMPTY: &str = "No calls found.";

/// `outbound - upsell`, or just the type when uncategorized.
pub fn type_label(call: &Call) -> String {
    let base = call.call_type.as_ref().map(CallType::as_str).unwrap_or("");
    match &call.call_category {
        Some(category) => format!("{base} - {category}"),
        None => base.to_string(),
    }
}

pub fn resolution_label(call: &Call) -> &'static str {
    if call.is_resolved_by_ai {
        "Resolved"
    } else {
        "Pending"
    }
}

fn call_rows(list: &ListDetail<Call>, first_index: usize) -> Table {
    let mut table = Table::new(vec!["Sr. No", "User Name", "Type", "AI Resolution"]);
    for (i, call) in list.items().iter().enumerate() {
        let marker = if list.selected_id() == Some(&call.id) { "*" } else { "" };
        table.push(vec![
            format!("{}{}", first_index + i + 1, marker),
            or_placeholder(call.customer().and_then(|u| u.name.as_deref()), NOT_AVAILABLE),
            type_label(call),
            resolution_label(call).to_string(),
        ]);
    }
    table
}

/// Admin call list, paged by the server and filtered by call type.
pub struct CallsView {
    pub list: ListDetail<Call>,
    pub pager: ServerPager,
    pub state: LoadState,
    filter: Option<CallType>,
}

impl Default for CallsView {
    fn default() -> Self {
        Self::new()
    }
}

impl CallsView {
    pub fn new() -> Self {
        Self {
            list: ListDetail::new(PROMPT),
            pager: ServerPager::new(),
            state: LoadState::Loading,
            filter: None,
        }
    }

    pub fn filter(&self) -> Option<&CallType> {
        self.filter.as_ref()
    }

    /// Change the type filter. Returns to page 1 when it actually changed.
    pub fn set_filter(&mut self, filter: Option<CallType>) {
        if self.filter != filter {
            self.filter = filter;
            self.pager.reset();
            self.state = LoadState::Loading;
        }
    }

    pub fn apply(&mut self, result: Result<Arc<Paged<Call>>, ApiError>) {
        match result {
            Ok(page) => {
                self.pager.update(page.meta.clone());
                self.state = LoadState::loaded(page.data.len(), EMPTY);
                self.list.replace_items(page.data.clone());
            }
            Err(err) => self.state = LoadState::failed("Calls", &err),
        }
    }

    pub fn table(&self) -> Table {
        call_rows(&self.list, 0)
    }

    pub fn footer(&self) -> String {
        self.pager.label("calls")
    }

    pub fn detail(&self) -> DetailPanel<'_, Call> {
        self.list.detail()
    }
}

/// Every call handled by the signed-in agent.
pub struct AgentCallsView {
    pub list: ListDetail<Call>,
    pub state: LoadState,
}

impl Default for AgentCallsView {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentCallsView {
    pub fn new() -> Self {
        Self {
            list: ListDetail::new(PROMPT),
            state: LoadState::Loading,
        }
    }

    pub fn apply(&mut self, result: Result<Arc<Vec<Call>>, ApiError>) {
        match result {
            Ok(calls) => {
                self.state = LoadState::loaded(calls.len(), EMPTY);
                self.list.replace_items(calls.as_ref().clone());
            }
            Err(err) => self.state = LoadState::failed("Calls", &err),
        }
    }

    pub fn table(&self) -> Table {
        call_rows(&self.list, 0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallTab {
    #[default]
    All,
    Satisfaction,
    Upsell,
}

impl CallTab {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(CallTab::All),
            "satisfaction" => Some(CallTab::Satisfaction),
            "upsell" => Some(CallTab::Upsell),
            _ => None,
        }
    }

    pub fn matches(&self, call: &Call) -> bool {
        match self {
            CallTab::All => true,
            CallTab::Satisfaction => call.call_category == Some(CallCategory::Satisfaction),
            CallTab::Upsell => call.call_category == Some(CallCategory::Upsell),
        }
    }
}

impl fmt::Display for CallTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CallTab::All => "all",
            CallTab::Satisfaction => "satisfaction",
            CallTab::Upsell => "upsell",
        })
    }
}

/// Agent outbound calls: filtered and paged on the client.
///
/// `list` always holds the visible page only, so selection follows what is
/// on screen.
pub struct OutboundCallsView {
    pub list: ListDetail<Call>,
    pub pager: ClientPager,
    pub state: LoadState,
    outbound: Vec<Call>,
    tab: CallTab,
}

impl OutboundCallsView {
    pub fn new(page_size: usize) -> Self {
        Self {
            list: ListDetail::new(PROMPT),
            pager: ClientPager::new(page_size),
            state: LoadState::Loading,
            outbound: Vec::new(),
            tab: CallTab::All,
        }
    }

    pub fn tab(&self) -> CallTab {
        self.tab
    }

    pub fn apply(&mut self, result: Result<Arc<Vec<Call>>, ApiError>) {
        match result {
            Ok(calls) => {
                let before = self.filtered_len();
                self.outbound = calls.iter().filter(|c| c.is_outbound()).cloned().collect();
                if self.filtered_len() != before {
                    self.pager.reset();
                }
                self.refresh();
            }
            Err(err) => self.state = LoadState::failed("Calls", &err),
        }
    }

    /// Switch category tab and return to page 1.
    pub fn set_tab(&mut self, tab: CallTab) {
        if self.tab != tab {
            self.tab = tab;
            self.pager.reset();
            self.refresh();
        }
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.pager.next();
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.pager.prev();
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn go_to(&mut self, page: usize) {
        self.pager.go_to(page);
        self.refresh();
    }

    fn filtered_len(&self) -> usize {
        self.outbound.iter().filter(|c| self.tab.matches(c)).count()
    }

    fn refresh(&mut self) {
        let filtered: Vec<Call> = self
            .outbound
            .iter()
            .filter(|c| self.tab.matches(c))
            .cloned()
            .collect();
        let visible = self.pager.slice(&filtered).to_vec();
        self.state = LoadState::loaded(filtered.len(), "No outbound calls found.");
        self.list.replace_items(visible);
    }

    pub fn table(&self) -> Table {
        let first = self.pager.page_range().start;
        call_rows(&self.list, first)
    }

    pub fn footer(&self) -> String {
        self.pager.label("calls")
    }
}

/// Display-ready call detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallCard {
    pub heading: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub call_type: String,
    pub resolution: &'static str,
    pub satisfied: Option<bool>,
    pub ticket: String,
    pub languages: Vec<String>,
    pub exchanges: Vec<(String, String)>,
    pub summary: String,
    pub date: String,
}

impl CallCard {
    pub fn from_call(call: &Call) -> Self {
        let customer = call.customer();
        Self {
            heading: format!("Call #{}", call.id),
            customer_name: or_placeholder(customer.and_then(|u| u.name.as_deref()), NOT_AVAILABLE),
            customer_email: or_placeholder(customer.and_then(|u| u.email.as_deref()), NOT_AVAILABLE),
            customer_phone: or_placeholder(customer.and_then(|u| u.phone.as_deref()), NOT_AVAILABLE),
            call_type: or_placeholder(call.call_type.as_ref().map(CallType::as_str), "Unknown"),
            resolution: if call.is_resolved_by_ai {
                "Resolved by AI"
            } else {
                "Pending Resolution"
            },
            satisfied: call.customer_satisfied,
            ticket: call
                .ticket_id
                .as_ref()
                .filter(|id| !id.is_empty())
                .map(|id| id.to_string())
                .unwrap_or_else(|| "Not Linked".to_string()),
            languages: call.languages.clone(),
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
            summary: or_placeholder(call.summary.as_deref(), "No summary available for this call."),
            date: format_date(call.created_at.as_deref()),
        }
    }

    pub fn render(&self) -> String {
        let satisfied = match self.satisfied {
            Some(true) => "Yes",
            Some(false) => "No",
            None => NOT_AVAILABLE,
        };
        let mut out = vec![
            format!("{}  [{}]", self.heading, self.resolution),
            format!("Customer:  {}", self.customer_name),
            format!("Email:     {}", self.customer_email),
            format!("Phone:     {}", self.customer_phone),
            format!("Type:      {}", self.call_type),
            format!("Satisfied: {satisfied}"),
            format!("Ticket:    {}", self.ticket),
            format!("Date:      {}", self.date),
        ];
        if !self.languages.is_empty() {
            out.push(format!("Languages: {}", self.languages.join(", ")));
        }
        if !self.exchanges.is_empty() {
            out.push(String::new());
            out.push(format!("Conversation ({} exchanges)", self.exchanges.len()));
            for (q, a) in &self.exchanges {
                out.push(format!("  Q: {q}"));
                out.push(format!("  A: {a}"));
            }
        }
        out.push(String::new());
        out.push(format!("Summary: {}", self.summary));
        out.join("\n")
    }
}
