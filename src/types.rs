//! Wire types for the support API and console configuration.
//!
//! The backend owns these schemas. Everything deserializes leniently: missing
//! fields default, unknown fields are ignored, and unexpected enum values are
//! kept in an `Other` variant instead of failing the whole collection.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Identifiers and string enums
// ============================================================================

/// Backend record id. The API sends numbers for most resources but strings
/// in a few places (select values, path params), so both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => EntityId(n.to_string()),
            RawId::Float(n) => EntityId(n.to_string()),
            RawId::Text(s) => EntityId(s),
        })
    }
}

/// Declares a string-valued enum that round-trips unknown values through
/// `Other` so a new backend status never breaks deserialization.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            /// Every value the console offers in selects, in display order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(value) => value.as_str(),
                }
            }

            /// Parse a known value. Unknown input is rejected here; use
            /// `From<String>` to preserve it instead.
            pub fn parse(value: &str) -> Option<Self> {
                match value.trim() {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn known_values() -> Vec<&'static str> {
                vec![$($wire),+]
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Console role carried on the signed-in account.
    Role { Admin => "admin", Agent => "agent" }
);

wire_enum!(
    TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
);

wire_enum!(
    TicketPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

wire_enum!(
    /// Queue a ticket (and the agent handling it) belongs to.
    TicketType { Support => "support", Sales => "sales", Billing => "billing" }
);

wire_enum!(
    CallType { Inbound => "inbound", Outbound => "outbound" }
);

wire_enum!(
    CallCategory { Satisfaction => "satisfaction", Upsell => "upsell" }
);

wire_enum!(
    UserStatus { Active => "active", Inactive => "inactive", Pending => "pending" }
);

// ============================================================================
// Resources
// ============================================================================

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A customer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    /// Outbound campaigns the customer accepts calls for.
    #[serde(default, rename = "isUpSellCall", deserialize_with = "null_as_default")]
    pub is_upsell_call: bool,
    #[serde(default, rename = "isSatisfactionCall", deserialize_with = "null_as_default")]
    pub is_satisfaction_call: bool,
    #[serde(default, rename = "isBothCall", deserialize_with = "null_as_default")]
    pub is_both_call: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A support staff account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub ticket_type: Option<TicketType>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl Agent {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Two-letter avatar text, e.g. "Sarah Chen" -> "SC".
    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Average rating when the backend computed one, else the stored rating.
    pub fn effective_rating(&self) -> Option<f64> {
        self.average_rating.or(self.rating)
    }
}

/// One question/answer exchange from a call transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub a: Option<String>,
}

/// The `userId` field of a call is either a populated user or a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallUserRef {
    Populated(User),
    Id(EntityId),
}

/// A recorded customer interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: EntityId,
    #[serde(default, rename = "type")]
    pub call_type: Option<CallType>,
    #[serde(default)]
    pub call_category: Option<CallCategory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_resolved_by_ai: bool,
    #[serde(default)]
    pub customer_satisfied: Option<bool>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default, rename = "QuestionsAnswers", deserialize_with = "null_as_default")]
    pub questions_answers: Vec<QuestionAnswer>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, rename = "User")]
    pub user: Option<User>,
    #[serde(default)]
    pub user_id: Option<CallUserRef>,
    #[serde(default)]
    pub ticket_id: Option<EntityId>,
}

impl Call {
    /// Customer attached to the call, from whichever relation the API populated.
    pub fn customer(&self) -> Option<&User> {
        match &self.user_id {
            Some(CallUserRef::Populated(user)) => Some(user),
            _ => self.user.as_ref(),
        }
    }

    pub fn is_outbound(&self) -> bool {
        self.call_type == Some(CallType::Outbound)
    }
}

/// Free-text note attached to a ticket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A customer support case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: EntityId,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub ticket_type: Option<TicketType>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub proposed_solution: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_satisfied: Option<bool>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub agent_id: Option<EntityId>,
    #[serde(default, rename = "User")]
    pub user: Option<User>,
    #[serde(default, rename = "Agent")]
    pub agent: Option<Agent>,
    #[serde(default, rename = "Calls", deserialize_with = "null_as_default")]
    pub calls: Vec<Call>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Vec<Note>,
}

/// Body for `POST /api/tickets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub status: TicketStatus,
    pub ticket_type: TicketType,
    pub priority: TicketPriority,
    pub summary: String,
    pub proposed_solution: String,
    pub user_id: EntityId,
    pub agent_id: EntityId,
}

impl NewTicket {
    /// Form defaults used when raising a ticket for a customer.
    pub fn for_user(user_id: EntityId) -> Self {
        Self {
            status: TicketStatus::Open,
            ticket_type: TicketType::Support,
            priority: TicketPriority::High,
            summary: String::new(),
            proposed_solution: String::new(),
            user_id,
            agent_id: EntityId::default(),
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Server pagination block returned alongside paged collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default = "default_page", deserialize_with = "null_as_first_page")]
    pub page: u32,
    #[serde(default = "default_page", deserialize_with = "null_as_first_page")]
    pub total_pages: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_prev: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

fn default_page() -> u32 {
    1
}

fn null_as_first_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_page))
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            has_next: false,
            has_prev: false,
            total: 0,
        }
    }
}

/// A page of records plus its pagination block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paged<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: PageMeta,
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDelta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub today: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCounts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub today: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inbound: CountDelta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outbound: CountDelta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: CountDelta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickets: CountDelta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calls: CallCounts,
}

/// One day of the 7-day call activity series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inbound: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outbound: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAgent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardScope {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub agent_id: Option<EntityId>,
}

/// Pre-aggregated dashboard payload from `GET /api/dashboard`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: DashboardSummary,
    #[serde(default, alias = "last7Days", alias = "timeseries", deserialize_with = "null_as_default")]
    pub call_activity: Vec<ActivityPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_agents: Vec<TopAgent>,
    #[serde(default)]
    pub scope: Option<DashboardScope>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Console configuration (~/.supportdesk/config.json).
///
/// Every field is defaulted so a partial file, or none at all, still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// How long a fetched collection counts as fresh.
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,
    /// How long an untouched cache entry is retained before eviction.
    #[serde(default = "default_cache_time_secs")]
    pub cache_time_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_stale_time_secs() -> u64 {
    5 * 60
}

fn default_cache_time_secs() -> u64 {
    30 * 60
}

fn default_page_size() -> usize {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            stale_time_secs: default_stale_time_secs(),
            cache_time_secs: default_cache_time_secs(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
