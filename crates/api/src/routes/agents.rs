//! Agent routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, extractors::AppJson, middleware::AuthUser};
use agencia_core::counterparty::NewAgent;
use agencia_db::AgentRepository;
use agencia_db::entities::agents;

/// Creates the agent routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/agents", get(list_agents).post(create_agent))
}

/// Request body for creating an agent.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAgentRequest {
    /// Name.
    pub nom: Option<String>,
    /// Email.
    pub email: Option<String>,
}

/// Response for an agent.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    /// Agent ID.
    pub id: Uuid,
    /// Name.
    pub nom: String,
    /// Email.
    pub email: Option<String>,
}

impl From<agents::Model> for AgentResponse {
    fn from(m: agents::Model) -> Self {
        Self {
            id: m.id,
            nom: m.nom,
            email: m.email,
        }
    }
}

/// GET `/agents` - List the agency's agents.
async fn list_agents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<AgentResponse>>> {
    let repo = AgentRepository::new((*state.db).clone());
    let rows = repo.list(auth.agency_id()).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST `/agents` - Create an agent.
async fn create_agent(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<CreateAgentRequest>,
) -> ApiResult<(StatusCode, Json<AgentResponse>)> {
    let input = NewAgent::parse(body.nom, body.email)?;
    let repo = AgentRepository::new((*state.db).clone());
    let model = repo.create(auth.agency_id(), input).await?;
    Ok((StatusCode::CREATED, Json(model.into())))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_commission_goes_to_agent() {
        let app = TestApp::new().await;
        let (status, agent) = app.post("/api/v1/agents", json!({"nom": "Nadia"})).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, op) = app
            .post(
                "/api/v1/caisse/sortie",
                json!({
                    "montant": 900,
                    "description": "Commission mars",
                    "categorie": "salaire_commission",
                    "agentId": agent["id"]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(op["agentId"], agent["id"]);

        let (status, body) = app
            .post(
                "/api/v1/caisse/sortie",
                json!({"montant": 900, "description": "Commission", "categorie": "salaire_commission"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing_link");
    }

    #[tokio::test]
    async fn test_name_required() {
        let app = TestApp::new().await;
        let (status, body) = app.post("/api/v1/agents", json!({"email": "a@b.dz"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing_required_field");
    }
}
