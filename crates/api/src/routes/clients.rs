//! Client routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{AppJson, AppPath},
    middleware::AuthUser,
};
use agencia_core::counterparty::NewClient;
use agencia_db::ClientRepository;
use agencia_db::entities::clients;

/// Creates the client routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/{id}", get(get_client))
}

/// Request body for creating a client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    /// Name.
    pub nom: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub telephone: Option<String>,
    /// Opening credit.
    pub solde_crediteur: Option<Decimal>,
}

/// Response for a client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    /// Client ID.
    pub id: Uuid,
    /// Name.
    pub nom: String,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub telephone: Option<String>,
    /// Credit the agency owes the client.
    pub solde_crediteur: Decimal,
}

impl From<clients::Model> for ClientResponse {
    fn from(m: clients::Model) -> Self {
        Self {
            id: m.id,
            nom: m.nom,
            email: m.email,
            telephone: m.telephone,
            solde_crediteur: m.solde_crediteur,
        }
    }
}

/// GET `/clients` - List the agency's clients.
async fn list_clients(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ClientResponse>>> {
    let repo = ClientRepository::new((*state.db).clone());
    let rows = repo.list(auth.agency_id()).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST `/clients` - Create a client.
async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    let input = NewClient::parse(body.nom, body.email, body.telephone, body.solde_crediteur)?;
    let repo = ClientRepository::new((*state.db).clone());
    let model = repo.create(auth.agency_id(), input).await?;
    Ok((StatusCode::CREATED, Json(model.into())))
}

/// GET `/clients/{id}` - Get a client.
async fn get_client(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<ClientResponse>> {
    let repo = ClientRepository::new((*state.db).clone());
    Ok(Json(repo.get(auth.agency_id(), id).await?.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{TestApp, create_client};

    #[tokio::test]
    async fn test_name_required() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post("/api/v1/clients", json!({"nom": "  ", "email": "a@b.dz"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing_required_field");
    }

    #[tokio::test]
    async fn test_credit_remission_lowers_balance() {
        let app = TestApp::new().await;
        let client_id = create_client(&app, "600").await;

        let (status, op) = app
            .post(
                "/api/v1/caisse/sortie",
                json!({
                    "montant": "250",
                    "description": "Avoir compensé",
                    "categorie": "remboursement_client",
                    "clientId": client_id,
                    "remboursementType": "solde"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(op["categorie"], "remboursement_client_remise");

        let (status, client) = app.get(&format!("/api/v1/clients/{client_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(client["soldeCrediteur"], "350");

        let (status, body) = app
            .post(
                "/api/v1/caisse/sortie",
                json!({
                    "montant": "1000",
                    "description": "Trop",
                    "categorie": "remboursement_client",
                    "clientId": client_id,
                    "remboursementType": "solde"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "insufficient_balance");
    }
}
