use super::{ApiClient, ApiRequest, Method};
use crate::error::ApiError;
use crate::types::{DashboardData, EntityId};

impl ApiClient {
    /// Global dashboard, or the agent-scoped one when `agent_id` is given.
    pub async fn dashboard(&self, agent_id: Option<&EntityId>) -> Result<DashboardData, ApiError> {
        let mut request = ApiRequest::new(Method::Get, "/api/dashboard");
        if let Some(agent_id) = agent_id {
            request = request.query("role", "agent").query("agentId", agent_id);
        }
        let body = self.execute(request).await?;
        if body.is_null() {
            return Ok(DashboardData::default());
        }
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::fake::FakeTransport;

    #[tokio::test]
    async fn test_agent_dashboard_query() {
        let fake = Arc::new(FakeTransport::new());
        fake.ok(
            Method::Get,
            "/api/dashboard",
            json!({"summary": {"tickets": {"total": 4, "today": 1}}, "topAgents": []}),
        );
        let client = ApiClient::new(fake.clone());

        let data = client.dashboard(Some(&EntityId::from(6u64))).await.unwrap();
        assert_eq!(data.summary.tickets.total, 4);

        let sent = &fake.requests()[0];
        assert_eq!(
            sent.query,
            vec![
                ("role".to_string(), "agent".to_string()),
                ("agentId".to_string(), "6".to_string())
            ]
        );
    }
}
