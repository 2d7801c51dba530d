//! Supplier routes.

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
use agencia_core::counterparty::NewSupplier;
use agencia_db::SupplierRepository;
use agencia_db::entities::suppliers;

/// Creates the supplier routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fournisseurs", get(list_suppliers).post(create_supplier))
        .route("/fournisseurs/{id}", get(get_supplier))
}

/// Request body for creating a supplier.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierRequest {
    /// Name.
    pub nom: Option<String>,
    /// Contact line.
    pub contact: Option<String>,
    /// Opening credit owed to the supplier.
    pub solde_crediteur: Option<Decimal>,
    /// Opening debt owed by the supplier.
    pub dette_fournisseur: Option<Decimal>,
}

/// Response for a supplier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    /// Supplier ID.
    pub id: Uuid,
    /// Name.
    pub nom: String,
    /// Contact line.
    pub contact: Option<String>,
    /// Credit owed to the supplier.
    pub solde_crediteur: Decimal,
    /// Debt owed by the supplier.
    pub dette_fournisseur: Decimal,
    /// Last balance change.
    pub updated_at: String,
}

impl From<suppliers::Model> for SupplierResponse {
    fn from(m: suppliers::Model) -> Self {
        Self {
            id: m.id,
            nom: m.nom,
            contact: m.contact,
            solde_crediteur: m.solde_crediteur,
            dette_fournisseur: m.dette_fournisseur,
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// GET `/fournisseurs` - List the agency's suppliers.
async fn list_suppliers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<SupplierResponse>>> {
    let repo = SupplierRepository::new((*state.db).clone());
    let rows = repo.list(auth.agency_id()).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST `/fournisseurs` - Create a supplier.
async fn create_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<CreateSupplierRequest>,
) -> ApiResult<(StatusCode, Json<SupplierResponse>)> {
    let input = NewSupplier::parse(
        body.nom,
        body.contact,
        body.solde_crediteur,
        body.dette_fournisseur,
    )?;
    let repo = SupplierRepository::new((*state.db).clone());
    let model = repo.create(auth.agency_id(), input).await?;
    Ok((StatusCode::CREATED, Json(model.into())))
}

/// GET `/fournisseurs/{id}` - Get a supplier with its balances.
async fn get_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<SupplierResponse>> {
    let repo = SupplierRepository::new((*state.db).clone());
    Ok(Json(repo.get(auth.agency_id(), id).await?.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_create_and_list() {
        let app = TestApp::new().await;
        let (status, created) = app
            .post(
                "/api/v1/fournisseurs",
                json!({"nom": "Atlas Voyages", "soldeCrediteur": "1200"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["soldeCrediteur"], "1200");
        assert_eq!(created["detteFournisseur"], "0");

        let (_, list) = app.get("/api/v1/fournisseurs").await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["nom"], "Atlas Voyages");
    }

    #[tokio::test]
    async fn test_negative_balance_rejected() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post(
                "/api/v1/fournisseurs",
                json!({"nom": "X", "detteFournisseur": "-5"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_field");
    }

    #[tokio::test]
    async fn test_unknown_supplier_is_404() {
        let app = TestApp::new().await;
        let (status, _) = app
            .get("/api/v1/fournisseurs/0190f5c2-0000-7000-8000-000000000000")
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app.get("/api/v1/fournisseurs/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_path");
    }
}
