//! Customer list and profile card.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ApiError;
use crate::types::{User, UserStatus};
use crate::util::{format_date, or_placeholder, NOT_AVAILABLE, UNKNOWN};
use crate::views::{DetailPanel, ListDetail, LoadState, Table};

pub const PROMPT: &str = "Select a user to view details";
pub const EMPTY: &str = "No users found.";

pub struct UsersView {
    pub list: ListDetail<User>,
    pub state: LoadState,
}

impl Default for UsersView {
    fn default() -> Self {
        Self::new()
    }
}

impl UsersView {
    pub fn new() -> Self {
        Self {
            list: ListDetail::new(PROMPT),
            state: LoadState::Loading,
        }
    }

    pub fn apply(&mut self, result: Result<Arc<Vec<User>>, ApiError>) {
        match result {
            Ok(users) => {
                self.state = LoadState::loaded(users.len(), EMPTY);
                self.list.replace_items(users.as_ref().clone());
            }
            Err(err) => self.state = LoadState::failed("Users", &err),
        }
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new(vec!["Sr. No", "Name", "Email", "Phone", "Role"]);
        for (i, user) in self.list.items().iter().enumerate() {
            let marker = if self.list.selected_id() == Some(&user.id) { "*" } else { "" };
            table.push(vec![
                format!("{}{}", i + 1, marker),
                or_placeholder(user.name.as_deref(), UNKNOWN),
                or_placeholder(user.email.as_deref(), UNKNOWN),
                or_placeholder(user.phone.as_deref(), UNKNOWN),
                or_placeholder(user.role.as_deref(), UNKNOWN),
            ]);
        }
        table
    }

    pub fn detail(&self) -> DetailPanel<'_, User> {
        self.list.detail()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    /// Badge text, `PENDING` when the status is missing.
    pub status: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub call_type: String,
    pub created: String,
    pub updated: String,
}

impl UserCard {
    pub fn from_user(user: &User) -> Self {
        Self {
            status: user
                .status
                .as_ref()
                .map(|s| s.as_str().to_uppercase())
                .unwrap_or_else(|| UserStatus::Pending.as_str().to_uppercase()),
            name: or_placeholder(user.name.as_deref(), NOT_AVAILABLE),
            email: or_placeholder(user.email.as_deref(), NOT_AVAILABLE),
            phone: or_placeholder(user.phone.as_deref(), NOT_AVAILABLE),
            role: or_placeholder(user.role.as_deref(), NOT_AVAILABLE),
            call_type: call_type_label(user).to_string(),
            created: format_date(user.created_at.as_deref()),
            updated: format_date(user.updated_at.as_deref()),
        }
    }

    pub fn render(&self) -> String {
        [
            format!("[{}]", self.status),
            format!("Name:         {}", self.name),
            format!("Email:        {}", self.email),
            format!("Phone:        {}", self.phone),
            format!("Role:         {}", self.role),
            format!("Call Type:    {}", self.call_type),
            format!("Created:      {}", self.created),
            format!("Last Updated: {}", self.updated),
        ]
        .join("\n")
    }
}

/// Satisfaction wins over upsell, upsell over both.
pub fn call_type_label(user: &User) -> &'static str {
    if user.is_satisfaction_call {
        "Satisfaction"
    } else if user.is_upsell_call {
        "Upsell"
    } else if user.is_both_call {
        "Both"
    } else {
        "General"
    }
}

/// Yes/No flags for the call-preference breakdown.
pub fn preference_flags(user: &User) -> [(&'static str, bool); 3] {
    [
        ("Upsell Call", user.is_upsell_call),
        ("Satisfaction Call", user.is_satisfaction_call),
        ("Both Calls", user.is_both_call),
    ]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rows_and_card() {
        let users: Vec<User> = serde_json::from_value(json!([
            {"id": 1, "name": "Dana", "email": "dana@example.com", "status": "active",
             "isUpSellCall": true, "isSatisfactionCall": false, "createdAt": "2025-01-02T00:00:00Z"},
            {"id": 2}
        ]))
        .unwrap();

        let mut view = UsersView::new();
        view.apply(Ok(Arc::new(users)));
        let table = view.table();
        assert_eq!(table.rows[0][1], "Dana");
        assert_eq!(table.rows[1], vec!["2", "Unknown", "Unknown", "Unknown", "Unknown"]);

        let DetailPanel::Selected(user) = view.detail() else {
            panic!("first user should be selected");
        };
        let card = UserCard::from_user(user);
        assert_eq!(card.status, "ACTIVE");
        assert_eq!(card.call_type, "Upsell");
        assert_eq!(card.phone, "N/A");
        assert_eq!(card.created, "1/2/2025");

        let blank = UserCard::from_user(&view.list.items()[1]);
        assert_eq!(blank.status, "PENDING");
        assert_eq!(blank.call_type, "General");
    }

    #[test]
    fn test_preference_flags() {
        let user: User = serde_json::from_value(json!({"id": 1, "isBothCall": true})).unwrap();
        assert_eq!(
            preference_flags(&user),
            [("Upsell Call", false), ("Satisfaction Call", false), ("Both Calls", true)]
        );
        assert_eq!(UserCard::from_user(&user).call_type, "Both");
    }

    #[test]
    fn test_call_type_precedence() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "isUpSellCall": true,
            "isSatisfactionCall": true,
            "isBothCall": true
        }))
        .unwrap();
        assert_eq!(call_type_label(&user), "Satisfaction");

        let upsell: User =
            serde_json::from_value(json!({"id": 2, "isUpSellCall": true, "isBothCall": true})).unwrap();
        assert_eq!(call_type_label(&upsell), "Upsell");
    }

    #[test]
    fn test_load_failure() {
        let mut view = UsersView::new();
        view.apply(Err(ApiError::Unauthenticated));
        assert!(view.state.message().unwrap().starts_with("Failed to load Users: "));
    }
}
