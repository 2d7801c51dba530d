//! Cash register routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{AppJson, AppPath, AppQuery},
    middleware::AuthUser,
};
use agencia_core::caisse::{
    CaisseError, CashCategory, CashSummary, OperationDraft, OperationRequest, OperationType,
    PeriodStatistics, StatisticsWindow,
};
use agencia_db::CaisseRepository;
use agencia_db::entities::cash_operations;
use agencia_db::repositories::{CashOperationFilter, OperationUpdate};
use agencia_shared::AppError;
use agencia_shared::types::{AgentId, ClientId, InvoiceId, PageMeta, PageRequest, SupplierId};

/// Creates the caisse routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/caisse/operations", get(list_operations))
        .route(
            "/caisse/operations/{id}",
            get(get_operation)
                .put(update_operation)
                .delete(delete_operation),
        )
        .route("/caisse/operations/{id}/annuler", put(cancel_operation))
        .route("/caisse/solde", get(get_solde))
        .route("/caisse/statistiques", get(get_statistics))
        .route("/caisse/entree", post(create_entree))
        .route("/caisse/sortie", post(create_sortie))
}

/// Parses an optional query parameter.
pub(crate) fn parse_param<T: FromStr<Err = String>>(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, CaisseError> {
    raw.map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            r.parse()
                .map_err(|reason| CaisseError::InvalidField { field, reason })
        })
        .transpose()
}

/// Query parameters for listing and totalling operations.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsQuery {
    /// Page number (1-indexed, default: 1).
    pub page: Option<u64>,
    /// Items per page (default: 20, max: 100).
    pub limit: Option<u64>,
    /// Earliest value date, inclusive.
    pub date_debut: Option<NaiveDate>,
    /// Latest value date, inclusive.
    pub date_fin: Option<NaiveDate>,
    /// Category.
    pub categorie: Option<String>,
    /// Payment mode.
    pub mode_paiement: Option<String>,
    /// `entree` or `sortie`.
    #[serde(rename = "type")]
    pub op_type: Option<String>,
}

impl OperationsQuery {
    fn filter(&self) -> Result<CashOperationFilter, CaisseError> {
        Ok(CashOperationFilter {
            date_from: self.date_debut,
            date_to: self.date_fin,
            category: parse_param::<CashCategory>("categorie", self.categorie.as_deref())?,
            payment_mode: parse_param("modePaiement", self.mode_paiement.as_deref())?,
            op_type: parse_param("type", self.op_type.as_deref())?,
        })
    }
}

/// Request body for `POST /caisse/entree` and `POST /caisse/sortie`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBody {
    /// Amount.
    pub montant: Option<Decimal>,
    /// Description.
    pub description: Option<String>,
    /// Category wire name.
    pub categorie: Option<String>,
    /// Optional reference.
    pub reference: Option<String>,
    /// Value date (defaults to today).
    pub date: Option<NaiveDate>,
    /// Payment mode (defaults to `especes`).
    pub mode_paiement: Option<String>,
    /// Must match the desk when present.
    #[serde(rename = "type_operation", alias = "typeOperation")]
    pub type_operation: Option<String>,
    /// Agent paid by a `salaire_commission`.
    pub agent_id: Option<AgentId>,
    /// Client refunded.
    pub client_id: Option<ClientId>,
    /// Invoice a client refund applies to.
    pub facture_id: Option<InvoiceId>,
    /// Supplier refunding or receiving an advance.
    pub fournisseur_id: Option<SupplierId>,
    /// `solde`, `dette` or `exceptionnel`.
    pub remboursement_type: Option<String>,
}

impl From<OperationBody> for OperationDraft {
    fn from(body: OperationBody) -> Self {
        Self {
            montant: body.montant,
            description: body.description,
            categorie: body.categorie,
            reference: body.reference,
            date: body.date,
            mode_paiement: body.mode_paiement,
            type_operation: body.type_operation,
            agent_id: body.agent_id,
            client_id: body.client_id,
            facture_id: body.facture_id,
            fournisseur_id: body.fournisseur_id,
            remboursement_type: body.remboursement_type,
        }
    }
}

/// Request body for editing an operation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOperationBody {
    /// New description.
    pub description: Option<String>,
    /// New reference; blank clears it.
    pub reference: Option<String>,
    /// New value date.
    pub date: Option<NaiveDate>,
    /// New payment mode.
    pub mode_paiement: Option<String>,
    /// New amount (unlinked operations only).
    pub montant: Option<Decimal>,
}

/// Response for a cash operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Operation ID.
    pub id: Uuid,
    /// `entree` or `sortie`.
    #[serde(rename = "type")]
    pub type_operation: String,
    /// Amount.
    pub montant: Decimal,
    /// Description.
    pub description: String,
    /// Recorded category.
    pub categorie: String,
    /// Payment mode.
    pub mode_paiement: String,
    /// Value date.
    pub date: NaiveDate,
    /// Reference.
    pub reference: Option<String>,
    /// Linked agent.
    pub agent_id: Option<Uuid>,
    /// Linked client.
    pub client_id: Option<Uuid>,
    /// Linked supplier.
    pub fournisseur_id: Option<Uuid>,
    /// Linked invoice.
    pub facture_id: Option<Uuid>,
    /// Remission type, when one applied.
    pub remboursement_type: Option<String>,
    /// Whether the row counts toward the register totals.
    pub comptabilisee: bool,
    /// Cancelled flag.
    pub annulee: bool,
    /// Cancellation timestamp.
    pub annulee_le: Option<String>,
    /// Who cancelled it.
    pub annulee_par: Option<Uuid>,
    /// Author.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<cash_operations::Model> for OperationResponse {
    fn from(m: cash_operations::Model) -> Self {
        let counted = !m.annulee
            && m.categorie
                .parse::<CashCategory>()
                .is_ok_and(CashCategory::is_counted);
        Self {
            id: m.id,
            type_operation: m.type_operation,
            montant: m.montant,
            description: m.description,
            categorie: m.categorie,
            mode_paiement: m.mode_paiement,
            date: m.date,
            reference: m.reference,
            agent_id: m.agent_id,
            client_id: m.client_id,
            fournisseur_id: m.fournisseur_id,
            facture_id: m.facture_id,
            remboursement_type: m.remboursement_type,
            comptabilisee: counted,
            annulee: m.annulee,
            annulee_le: m.annulee_le.map(|t| t.to_rfc3339()),
            annulee_par: m.annulee_par,
            created_by: m.created_by,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Response for a page of operations.
#[derive(Debug, Serialize)]
pub struct OperationListResponse {
    /// Operations, newest first.
    pub operations: Vec<OperationResponse>,
    /// Pagination metadata.
    pub pagination: PageMeta,
}

/// Register totals.
#[derive(Debug, Serialize)]
pub struct SoldeResponse {
    /// Counted entries.
    pub entrees: Decimal,
    /// Counted exits.
    pub sorties: Decimal,
    /// `entrees - sorties`.
    pub total: Decimal,
}

impl From<CashSummary> for SoldeResponse {
    fn from(s: CashSummary) -> Self {
        Self {
            entrees: s.entrees,
            sorties: s.sorties,
            total: s.solde,
        }
    }
}

/// Query parameters for statistics.
#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    /// Window length in days.
    pub periode: Option<u32>,
}

/// GET `/caisse/operations` - List operations with pagination.
async fn list_operations(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<OperationsQuery>,
) -> ApiResult<Json<OperationListResponse>> {
    let filter = query.filter()?;
    let page = PageRequest::from_query(query.page, query.limit);

    let repo = CaisseRepository::new((*state.db).clone());
    let (rows, total) = repo.list_operations(auth.agency_id(), &filter, page).await?;

    Ok(Json(OperationListResponse {
        operations: rows.into_iter().map(Into::into).collect(),
        pagination: PageMeta::new(page, total),
    }))
}

/// GET `/caisse/solde` - Register totals over the filtered operations.
async fn get_solde(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<OperationsQuery>,
) -> ApiResult<Json<SoldeResponse>> {
    let filter = query.filter()?;
    let repo = CaisseRepository::new((*state.db).clone());
    let summary = repo.summary(auth.agency_id(), &filter).await?;
    Ok(Json(summary.into()))
}

/// GET `/caisse/statistiques` - Statistics over the last `periode` days.
async fn get_statistics(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<StatisticsQuery>,
) -> ApiResult<Json<PeriodStatistics>> {
    let window = StatisticsWindow::ending(Utc::now().date_naive(), query.periode)?;
    let repo = CaisseRepository::new((*state.db).clone());
    Ok(Json(repo.statistics(auth.agency_id(), window).await?))
}

/// POST `/caisse/entree` - Record an entry.
async fn create_entree(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<OperationBody>,
) -> ApiResult<(StatusCode, Json<OperationResponse>)> {
    create_operation(&state, &auth, OperationType::Entree, body).await
}

/// POST `/caisse/sortie` - Record an exit.
async fn create_sortie(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<OperationBody>,
) -> ApiResult<(StatusCode, Json<OperationResponse>)> {
    create_operation(&state, &auth, OperationType::Sortie, body).await
}

async fn create_operation(
    state: &AppState,
    auth: &AuthUser,
    desk: OperationType,
    body: OperationBody,
) -> ApiResult<(StatusCode, Json<OperationResponse>)> {
    let request = OperationRequest::parse(body.into(), desk, Utc::now().date_naive())?;

    let repo = CaisseRepository::new((*state.db).clone());
    let model = repo
        .create_operation(auth.agency_id(), auth.user_id(), request)
        .await?;

    Ok((StatusCode::CREATED, Json(model.into())))
}

/// GET `/caisse/operations/{id}` - Get one operation.
async fn get_operation(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<OperationResponse>> {
    let repo = CaisseRepository::new((*state.db).clone());
    Ok(Json(repo.get_operation(auth.agency_id(), id).await?.into()))
}

/// PUT `/caisse/operations/{id}` - Edit an operation.
async fn update_operation(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateOperationBody>,
) -> ApiResult<Json<OperationResponse>> {
    let update = OperationUpdate {
        description: body.description,
        reference: body.reference,
        date: body.date,
        payment_mode: parse_param("modePaiement", body.mode_paiement.as_deref())?,
        amount: body.montant,
    };

    let repo = CaisseRepository::new((*state.db).clone());
    let model = repo.update_operation(auth.agency_id(), id, update).await?;
    Ok(Json(model.into()))
}

/// PUT `/caisse/operations/{id}/annuler` - Cancel an operation.
async fn cancel_operation(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<OperationResponse>> {
    let repo = CaisseRepository::new((*state.db).clone());
    let model = repo
        .cancel_operation(auth.agency_id(), id, auth.user_id())
        .await?;
    Ok(Json(model.into()))
}

/// DELETE `/caisse/operations/{id}` - Physically delete an operation.
async fn delete_operation(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !auth.claims().can_delete_operations() {
        warn!(
            user_id = %auth.user_id(),
            role = %auth.claims().role,
            operation_id = %id,
            "delete refused"
        );
        return Err(AppError::Forbidden(
            "Seuls les rôles admin et owner peuvent supprimer une opération".to_string(),
        )
        .into());
    }

    let repo = CaisseRepository::new((*state.db).clone());
    repo.delete_operation(auth.agency_id(), id).await?;
    info!(user_id = %auth.user_id(), operation_id = %id, "operation deleted by request");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    use crate::routes::test_support::{TestApp, create_supplier};

    #[tokio::test]
    async fn test_requires_token() {
        let app = TestApp::new().await;
        let (status, body) = app.get_anonymous("/api/v1/caisse/solde").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_entry_then_solde() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post(
                "/api/v1/caisse/entree",
                json!({"montant": "5000", "description": "Vente billet", "categorie": "autre_entree"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["type"], "entree");
        assert_eq!(body["modePaiement"], "especes");
        assert_eq!(body["comptabilisee"], true);

        let (status, body) = app.get("/api/v1/caisse/solde").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entrees"], "5000");
        assert_eq!(body["total"], "5000");
    }

    #[tokio::test]
    async fn test_missing_field_is_400() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post(
                "/api/v1/caisse/sortie",
                json!({"description": "Fournitures", "categorie": "achat_direct"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing_required_field");
    }

    #[tokio::test]
    async fn test_wrong_desk_is_400() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post(
                "/api/v1/caisse/entree",
                json!({"montant": 10, "description": "x", "categorie": "achat_direct"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_category");

        let (status, body) = app
            .post(
                "/api/v1/caisse/entree",
                json!({"montant": 10, "description": "x", "categorie": "autre_entree", "type_operation": "sortie"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_field");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post("/api/v1/caisse/entree", json!({"montant": ["nope"]}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_body");
    }

    #[tokio::test]
    async fn test_supplier_remission_and_cancel() {
        let app = TestApp::new().await;
        let supplier_id = create_supplier(&app, "10000", "0").await;

        let (status, op) = app
            .post(
                "/api/v1/caisse/entree",
                json!({
                    "montant": "3000",
                    "description": "Remise sur solde",
                    "categorie": "remboursement_fournisseur",
                    "fournisseurId": supplier_id,
                    "remboursementType": "solde"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(op["categorie"], "remboursement_fournisseur_remise");
        assert_eq!(op["comptabilisee"], false);

        let (_, supplier) = app.get(&format!("/api/v1/fournisseurs/{supplier_id}")).await;
        assert_eq!(supplier["soldeCrediteur"], "7000");
        let (_, solde) = app.get("/api/v1/caisse/solde").await;
        assert_eq!(solde["entrees"], "0");

        let id = op["id"].as_str().unwrap();
        let (status, cancelled) = app
            .put(&format!("/api/v1/caisse/operations/{id}/annuler"), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["annulee"], true);
        let (_, supplier) = app.get(&format!("/api/v1/fournisseurs/{supplier_id}")).await;
        assert_eq!(supplier["soldeCrediteur"], "10000");
    }

    #[tokio::test]
    async fn test_delete_needs_role() {
        let app = TestApp::new().await;
        let (_, op) = app
            .post(
                "/api/v1/caisse/sortie",
                json!({"montant": 40, "description": "Taxi", "categorie": "autre_sortie"}),
            )
            .await;
        let uri = format!("/api/v1/caisse/operations/{}", op["id"].as_str().unwrap());

        let cashier = app.with_role("cashier");
        let (status, body) = cashier.delete(&uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, _) = app.delete(&uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_agency_isolation() {
        let app = TestApp::new().await;
        let (_, op) = app
            .post(
                "/api/v1/caisse/entree",
                json!({"montant": 10, "description": "x", "categorie": "autre_entree"}),
            )
            .await;
        let uri = format!("/api/v1/caisse/operations/{}", op["id"].as_str().unwrap());

        let other = app.for_agency(Uuid::now_v7());
        let (status, _) = other.get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, list) = other.get("/api/v1/caisse/operations").await;
        assert_eq!(list["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_statistics() {
        let app = TestApp::new().await;
        for (montant, categorie, desk) in [
            ("100", "autre_entree", "entree"),
            ("50", "achat_direct", "sortie"),
            ("25", "autre_sortie", "sortie"),
        ] {
            let (status, _) = app
                .post(
                    &format!("/api/v1/caisse/{desk}"),
                    json!({"montant": montant, "description": "x", "categorie": categorie}),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, list) = app.get("/api/v1/caisse/operations?type=sortie&limit=1").await;
        assert_eq!(list["pagination"]["total"], 2);
        assert_eq!(list["pagination"]["pages"], 2);
        assert_eq!(list["operations"].as_array().unwrap().len(), 1);

        let (status, body) = app.get("/api/v1/caisse/operations?categorie=inconnue").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_field");

        let (status, stats) = app.get("/api/v1/caisse/statistiques?periode=7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["periode"], 7);
        assert_eq!(stats["solde"], "25");
        assert_eq!(stats["parJour"].as_array().unwrap().len(), 7);

        let (status, _) = app.get("/api/v1/caisse/statistiques?periode=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
