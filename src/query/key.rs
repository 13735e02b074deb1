use std::fmt;

/// Cache key: a resource name followed by zero or more parameters.
///
/// `["calls", "2", "inbound"]` is the second inbound page. Invalidation
/// matches by prefix, so `["calls"]` covers every calls entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn resource(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Append a parameter segment.
    pub fn with(mut self, param: impl fmt::Display) -> Self {
        self.0.push(param.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for QueryKey {
    fn from(value: &str) -> Self {
        Self::from_segments(value.split('/').filter(|s| !s.is_empty()))
    }
}

/// Keys used by the console. Each list key doubles as the invalidation
/// prefix for its scoped variants.
pub mod keys {
    use super::QueryKey;
    use crate::types::EntityId;

    pub fn tickets() -> QueryKey {
        QueryKey::resource("tickets")
    }

    pub fn ticket(id: &EntityId) -> QueryKey {
        QueryKey::resource("ticket").with(id)
    }

    pub fn ticket_notes(ticket_id: &EntityId) -> QueryKey {
        QueryKey::resource("ticketNotes").with(ticket_id)
    }

    pub fn calls() -> QueryKey {
        QueryKey::resource("calls")
    }

    pub fn call(id: &EntityId) -> QueryKey {
        QueryKey::resource("call").with(id)
    }

    pub fn recording_url(call_id: &EntityId) -> QueryKey {
        QueryKey::resource("recordingUrl").with(call_id)
    }

    pub fn agents() -> QueryKey {
        QueryKey::resource("agents")
    }

    pub fn users() -> QueryKey {
        QueryKey::resource("users")
    }

    pub fn dashboard() -> QueryKey {
        QueryKey::resource("dashboard")
    }

    pub fn agent_dashboard() -> QueryKey {
        QueryKey::resource("agent-dashboard")
    }
}
