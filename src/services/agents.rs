// Agents service: roster, create/edit form, delete, and password change.

use std::sync::Arc;

use crate::api::AgentPayload;
use crate::error::ApiError;
use crate::mutation::MutationSpec;
use crate::query::keys;
use crate::state::AppState;
use crate::types::{Agent, EntityId, TicketType};
use crate::util::{is_valid_email, validate_bounded_string, validate_enum_string};

const MAX_NAME_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 6;

pub async fn load_agents(state: &AppState) -> Result<Arc<Vec<Agent>>, ApiError> {
    state
        .cache
        .fetch(&keys::agents(), || state.api.list_agents())
        .await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentFormMode {
    Create,
    Edit(EntityId),
}

/// Pending create/edit form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentForm {
    pub mode: AgentFormMode,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub ticket_type: String,
}

impl AgentForm {
    pub fn create() -> Self {
        Self {
            mode: AgentFormMode::Create,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            ticket_type: String::new(),
        }
    }

    /// Prefill from an existing agent. The password field stays empty and is not sent.
    pub fn edit(agent: &Agent) -> Self {
        Self {
            mode: AgentFormMode::Edit(agent.id.clone()),
            first_name: agent.first_name.clone(),
            last_name: agent.last_name.clone(),
            email: agent.email.clone().unwrap_or_default(),
            password: String::new(),
            ticket_type: agent
                .ticket_type
                .as_ref()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<AgentPayload, String> {
        let first_name = validate_bounded_string(&self.first_name, "First name", MAX_NAME_LEN)?;
        let last_name = validate_bounded_string(&self.last_name, "Last name", MAX_NAME_LEN)?;

        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err("Please enter a valid email address".to_string());
        }

        let ticket_type = validate_enum_string(
            &self.ticket_type,
            "ticket type",
            &TicketType::known_values(),
        )?;

        let password = match self.mode {
            AgentFormMode::Create => {
                if self.password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(format!(
                        "Password should be at least {MIN_PASSWORD_LEN} characters."
                    ));
                }
                Some(self.password.clone())
            }
            AgentFormMode::Edit(_) => None,
        };

        Ok(AgentPayload {
            first_name,
            last_name,
            email,
            password,
            ticket_type: TicketType::from(ticket_type),
        })
    }
}

/// Validate and submit the form in its current mode.
pub async fn submit_agent_form(state: &AppState, form: &AgentForm) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(message) => return dispatcher.reject("Error", message),
    };

    match &form.mode {
        AgentFormMode::Create => {
            let spec = MutationSpec::new("create_agent")
                .invalidates(keys::agents())
                .on_success("Agent created successfully")
                .on_failure("Failed to create agent. Please try again.")
                .fallback_only();
            dispatcher.run(spec, state.api.create_agent(&payload)).await?;
        }
        AgentFormMode::Edit(id) => {
            let spec = MutationSpec::new("update_agent")
                .invalidates(keys::agents())
                .on_success("Agent updated successfully")
                .on_failure("Failed to update agent. Please try again.")
                .fallback_only();
            dispatcher.run(spec, state.api.update_agent(id, &payload)).await?;
        }
    }
    Ok(())
}

pub async fn delete_agent(state: &AppState, agent_id: &EntityId) -> Result<(), ApiError> {
    let spec = MutationSpec::new("delete_agent")
        .invalidates(keys::agents())
        .on_success("Agent deleted successfully")
        .on_failure("Failed to delete agent. Please try again.")
        .fallback_only();
    state
        .dispatcher()
        .run(spec, state.api.delete_agent(agent_id))
        .await
        .map(|_| ())
}

/// New password plus confirmation for the signed-in account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChange {
    pub password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// `(title, message)` of the first failing rule.
    pub fn check(&self) -> Result<(), (&'static str, String)> {
        if self.password.is_empty() || self.confirm_password.is_empty() {
            return Err((
                "Missing fields",
                "Please enter and confirm your new password.".to_string(),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err((
                "Weak password",
                format!("Password should be at least {MIN_PASSWORD_LEN} characters."),
            ));
        }
        if self.password != self.confirm_password {
            return Err((
                "Password mismatch",
                "Your new password and confirmation do not match. Please try again.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Change the signed-in account's password. Validation failures never reach the API.
pub async fn update_password(state: &AppState, change: &PasswordChange) -> Result<(), ApiError> {
    let dispatcher = state.dispatcher();
    let user = match state.require_user() {
        Ok(user) if !user.id.is_empty() => user,
        _ => return dispatcher.reject("No user", "User ID not found. Please sign in again."),
    };
    if let Err((title, message)) = change.check() {
        return dispatcher.reject(title, message);
    }

    let spec = MutationSpec::new("update_password")
        .on_success("Password updated successfully")
        .on_failure("Failed to update password. Please try again.");
    dispatcher
        .run(spec, state.api.update_agent_password(&user.id, &change.password))
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::Method;
    use crate::services::testing::signed_in;
    use crate::state::AppState;
    use crate::types::{Config, Role};

    fn filled_form() -> AgentForm {
        AgentForm {
            first_name: "Priya".into(),
            last_name: "Nair".into(),
            email: "priya@example.com".into(),
            password: "secret1".into(),
            ticket_type: "billing".into(),
            ..AgentForm::create()
        }
    }

    #[test]
    fn test_form_validation() {
        let payload = filled_form().validate().unwrap();
        assert_eq!(payload.ticket_type, TicketType::Billing);
        assert_eq!(payload.password.as_deref(), Some("secret1"));

        let mut bad = filled_form();
        bad.email = "priya".into();
        assert_eq!(bad.validate().unwrap_err(), "Please enter a valid email address");

        let mut bad = filled_form();
        bad.ticket_type = "refunds".into();
        assert!(bad.validate().unwrap_err().contains("support, sales, billing"));

        let mut bad = filled_form();
        bad.password = "abc".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_edit_form_omits_password() {
        let agent = Agent {
            id: EntityId::from(4u64),
            first_name: "Sam".into(),
            last_name: "Lee".into(),
            email: Some("sam@example.com".into()),
            ticket_type: Some(TicketType::Sales),
            ..Agent::default()
        };
        let form = AgentForm::edit(&agent);
        assert_eq!(form.ticket_type, "sales");

        let payload = form.validate().unwrap();
        assert!(payload.password.is_none());
        let body = serde_json::to_value(&payload).unwrap();
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_create_failure_shows_fixed_message() {
        let (state, fake) = signed_in(Role::Admin, 1);
        fake.respond(Method::Post, "/api/agents", 400, json!({"error": "duplicate email"}));

        assert!(submit_agent_form(&state, &filled_form()).await.is_err());
        assert_eq!(
            state.notifications.latest().unwrap().message,
            "Failed to create agent. Please try again."
        );
    }

    #[test]
    fn test_password_rules_in_order() {
        let change = |p: &str, c: &str| PasswordChange {
            password: p.into(),
            confirm_password: c.into(),
        };
        assert_eq!(change("", "x").check().unwrap_err().0, "Missing fields");
        assert_eq!(change("abc", "abc").check().unwrap_err().0, "Weak password");
        assert_eq!(change("abcdef", "abcdeg").check().unwrap_err().0, "Password mismatch");
        assert!(change("abcdef", "abcdef").check().is_ok());
    }

    #[tokio::test]
    async fn test_password_update_targets_own_account() {
        let (state, fake) = signed_in(Role::Agent, 21);
        fake.ok(Method::Put, "/api/agents/21", json!({}));

        let change = PasswordChange {
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        };
        update_password(&state, &change).await.unwrap();
        assert_eq!(fake.requests()[0].body, Some(json!({"password": "hunter22"})));
        assert_eq!(
            state.notifications.latest().unwrap().message,
            "Password updated successfully"
        );
    }

    #[tokio::test]
    async fn test_password_update_without_session() {
        let state = AppState::new(
            Config::default(),
            std::sync::Arc::new(crate::api::fake::FakeTransport::new()),
            None,
        );
        let change = PasswordChange {
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        };
        assert!(update_password(&state, &change).await.is_err());
        assert_eq!(state.notifications.latest().unwrap().title, "No user");
    }
}
