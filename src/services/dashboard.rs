// Dashboard service: fetch the pre-aggregated summary and derive the read-only view.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ApiError;
use crate::query::keys;
use crate::routes::{AdminPage, AgentPage, Route};
use crate::state::AppState;
use crate::types::{ActivityPoint, DashboardData, EntityId, Role, TopAgent};

const ADMIN_LEADERBOARD: usize = 5;
const AGENT_LEADERBOARD: usize = 3;

/// Admins load the global summary, agents their own scoped one.
pub async fn load_dashboard(state: &AppState) -> Result<(Role, Arc<DashboardData>), ApiError> {
    let user = state.require_user()?;
    let role = user.role.clone().ok_or(ApiError::Unauthenticated)?;

    let data = match &role {
        Role::Agent => {
            let key = keys::agent_dashboard().with(&user.id);
            state
                .cache
                .fetch(&key, || state.api.dashboard(Some(&user.id)))
                .await?
        }
        _ => {
            state
                .cache
                .fetch(&keys::dashboard(), || state.api.dashboard(None))
                .await?
        }
    };
    Ok((role, data))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub title: &'static str,
    pub value: u64,
    /// Shown as a "+N" badge when positive.
    pub today: u64,
    pub link: Route,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub agent_id: EntityId,
    pub name: String,
    pub email: Option<String>,
    pub rating: f64,
    pub calls: u64,
    pub is_self: bool,
}

impl LeaderboardRow {
    pub fn label(&self) -> String {
        if self.is_self {
            format!("{} (You)", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum OwnPerformance {
    Entry(LeaderboardRow),
    Unavailable { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stat_cards: Vec<StatCard>,
    pub call_activity: Vec<ActivityPoint>,
    pub leaderboard: Vec<LeaderboardRow>,
    /// Inbound calls as a percentage of all calls, one decimal.
    pub inbound_share: f64,
    /// Mean rating across the top agents, one decimal.
    pub average_rating: f64,
    pub today_activity: u64,
    /// Agent dashboards only.
    pub own_performance: Option<OwnPerformance>,
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn row(rank: usize, agent: &TopAgent, own_id: Option<&EntityId>) -> LeaderboardRow {
    LeaderboardRow {
        rank,
        agent_id: agent.agent_id.clone(),
        name: agent.name.clone(),
        email: agent.email.clone(),
        rating: one_decimal(agent.avg),
        calls: agent.count,
        is_self: own_id == Some(&agent.agent_id),
    }
}

impl DashboardView {
    /// Derive the view for `role`. `own_id` identifies the signed-in agent
    /// when the payload carries no scope.
    pub fn build(data: &DashboardData, role: &Role, own_id: Option<&EntityId>) -> Self {
        let summary = &data.summary;
        let is_agent = *role == Role::Agent;

        let inbound_share = if summary.calls.total > 0 {
            one_decimal(summary.calls.inbound.total as f64 / summary.calls.total as f64 * 100.0)
        } else {
            0.0
        };

        let average_rating = if data.top_agents.is_empty() {
            0.0
        } else {
            let sum: f64 = data.top_agents.iter().map(|a| a.avg).sum();
            one_decimal(sum / data.top_agents.len() as f64)
        };

        if is_agent {
            let own_id = data
                .scope
                .as_ref()
                .and_then(|s| s.agent_id.as_ref())
                .or(own_id);

            let leaderboard = data
                .top_agents
                .iter()
                .take(AGENT_LEADERBOARD)
                .enumerate()
                .map(|(i, agent)| row(i + 1, agent, own_id))
                .collect();

            let own_performance = data
                .top_agents
                .iter()
                .position(|a| own_id == Some(&a.agent_id))
                .map(|i| OwnPerformance::Entry(row(i + 1, &data.top_agents[i], own_id)))
                .unwrap_or(OwnPerformance::Unavailable {
                    message: "Performance data not available",
                });

            let card = |title, value: crate::types::CountDelta, page| StatCard {
                title,
                value: value.total,
                today: value.today,
                link: Route::Agent(page),
            };

            Self {
                stat_cards: vec![
                    card("Total Tickets", summary.tickets, AgentPage::Tickets),
                    StatCard {
                        title: "Total Calls",
                        value: summary.calls.total,
                        today: summary.calls.today,
                        link: Route::Agent(AgentPage::Calls),
                    },
                    card("Inbound Calls", summary.calls.inbound, AgentPage::Calls),
                    card("Outbound Calls", summary.calls.outbound, AgentPage::Outbound),
                ],
                call_activity: data.call_activity.clone(),
                leaderboard,
                inbound_share,
                average_rating,
                today_activity: summary.tickets.today + summary.calls.today,
                own_performance: Some(own_performance),
            }
        } else {
            let leaderboard = data
                .top_agents
                .iter()
                .take(ADMIN_LEADERBOARD)
                .enumerate()
                .map(|(i, agent)| row(i + 1, agent, None))
                .collect();

            let card = |title, value: crate::types::CountDelta, page| StatCard {
                title,
                value: value.total,
                today: value.today,
                link: Route::Admin(page),
            };

            Self {
                stat_cards: vec![
                    card("Total Users", summary.users, AdminPage::Users),
                    card("Total Tickets", summary.tickets, AdminPage::Tickets),
                    StatCard {
                        title: "Total Calls",
                        value: summary.calls.total,
                        today: summary.calls.today,
                        link: Route::Admin(AdminPage::Calls),
                    },
                    card("Inbound Calls", summary.calls.inbound, AdminPage::Calls),
                    card("Outbound Calls", summary.calls.outbound, AdminPage::Calls),
                ],
                call_activity: data.call_activity.clone(),
                leaderboard,
                inbound_share,
                average_rating,
                today_activity: summary.users.today + summary.tickets.today + summary.calls.today,
                own_performance: None,
            }
        }
    }
}
