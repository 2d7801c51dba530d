//! Invoice routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{AppJson, AppPath, AppQuery},
    middleware::AuthUser,
    routes::caisse::{OperationResponse, parse_param},
};
use agencia_core::caisse::PaymentMode;
use agencia_core::invoice::{InvoiceDraft, InvoiceError, InvoiceStatistics, NewInvoice};
use agencia_db::InvoiceRepository;
use agencia_db::entities::invoices;
use agencia_db::repositories::{InvoiceFilter, InvoicePaymentInput, invoice_amounts};
use agencia_shared::types::{ClientId, PageMeta, PageRequest, SupplierId};

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/factures", get(list_invoices).post(create_invoice))
        .route("/factures/statistiques", get(get_statistics))
        .route("/factures/{id}", get(get_invoice))
        .route("/factures/{id}/annuler", put(cancel_invoice))
        .route("/factures/{id}/paiements", post(record_payment))
}

/// Query parameters for listing invoices.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicesQuery {
    /// Page number (1-indexed, default: 1).
    pub page: Option<u64>,
    /// Items per page (default: 20, max: 100).
    pub limit: Option<u64>,
    /// Effective status.
    pub statut: Option<String>,
    /// `client` or `fournisseur`.
    pub kind: Option<String>,
    /// Only this client's invoices.
    pub client_id: Option<Uuid>,
    /// Only this supplier's invoices.
    pub fournisseur_id: Option<Uuid>,
}

/// Query parameters for invoice statistics.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceStatisticsQuery {
    /// `client` or `fournisseur`.
    pub kind: Option<String>,
}

/// Request body for creating an invoice.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    /// Invoice number, unique per agency.
    pub numero: Option<String>,
    /// `client` or `fournisseur`.
    pub kind: Option<String>,
    /// Client for a client invoice.
    pub client_id: Option<ClientId>,
    /// Supplier for a supplier invoice.
    pub fournisseur_id: Option<SupplierId>,
    /// Amount before tax.
    pub montant_ht: Option<Decimal>,
    /// Amount including tax.
    pub montant_ttc: Option<Decimal>,
    /// `brouillon` (default) or `envoyee`.
    pub statut: Option<String>,
    /// Issue date.
    pub date_emission: Option<NaiveDate>,
    /// Due date.
    pub date_echeance: Option<NaiveDate>,
}

impl From<CreateInvoiceRequest> for InvoiceDraft {
    fn from(body: CreateInvoiceRequest) -> Self {
        Self {
            numero: body.numero,
            kind: body.kind,
            client_id: body.client_id,
            fournisseur_id: body.fournisseur_id,
            montant_ht: body.montant_ht,
            montant_ttc: body.montant_ttc,
            statut: body.statut,
            date_emission: body.date_emission,
            date_echeance: body.date_echeance,
        }
    }
}

/// Request body for a payment.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount paid.
    pub montant: Option<Decimal>,
    /// Payment mode (defaults to `especes`).
    pub mode_paiement: Option<String>,
    /// Value date (defaults to today).
    pub date: Option<NaiveDate>,
    /// Optional reference.
    pub reference: Option<String>,
}

/// Response for an invoice.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice number.
    pub numero: String,
    /// `client` or `fournisseur`.
    pub kind: String,
    /// Client.
    pub client_id: Option<Uuid>,
    /// Supplier.
    pub fournisseur_id: Option<Uuid>,
    /// Amount before tax.
    pub montant_ht: Decimal,
    /// Amount including tax.
    pub montant_ttc: Decimal,
    /// Amount paid so far.
    pub montant_paye: Decimal,
    /// Amount still due.
    pub montant_restant: Decimal,
    /// Effective status.
    pub statut: String,
    /// Issue date.
    pub date_emission: NaiveDate,
    /// Due date.
    pub date_echeance: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: String,
}

impl TryFrom<invoices::Model> for InvoiceResponse {
    type Error = agencia_db::RepositoryError;

    fn try_from(m: invoices::Model) -> Result<Self, Self::Error> {
        let amounts = invoice_amounts(&m)?;
        Ok(Self {
            id: m.id,
            numero: m.numero,
            kind: m.kind,
            client_id: m.client_id,
            fournisseur_id: m.fournisseur_id,
            montant_ht: m.montant_ht,
            montant_ttc: m.montant_ttc,
            montant_paye: m.montant_paye,
            montant_restant: amounts.remaining(),
            statut: amounts.status().as_str().to_string(),
            date_emission: m.date_emission,
            date_echeance: m.date_echeance,
            created_at: m.created_at.to_rfc3339(),
        })
    }
}

/// Response for a page of invoices.
#[derive(Debug, Serialize)]
pub struct InvoiceListResponse {
    /// Invoices, newest first.
    pub factures: Vec<InvoiceResponse>,
    /// Pagination metadata.
    pub pagination: PageMeta,
}

/// Response for a recorded payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Invoice after the payment.
    pub facture: InvoiceResponse,
    /// Register row written for the payment.
    pub operation: OperationResponse,
}

fn invoice_field<T: std::str::FromStr<Err = String>>(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, InvoiceError> {
    raw.map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            r.parse()
                .map_err(|reason| InvoiceError::InvalidField { field, reason })
        })
        .transpose()
}

/// GET `/factures` - List invoices, filtered on their effective status.
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<InvoicesQuery>,
) -> ApiResult<Json<InvoiceListResponse>> {
    let filter = InvoiceFilter {
        status: invoice_field("statut", query.statut.as_deref())?,
        kind: invoice_field("kind", query.kind.as_deref())?,
        client_id: query.client_id,
        supplier_id: query.fournisseur_id,
    };
    let page = PageRequest::from_query(query.page, query.limit);

    let repo = InvoiceRepository::new((*state.db).clone());
    let (rows, total) = repo.list_invoices(auth.agency_id(), &filter, page).await?;

    Ok(Json(InvoiceListResponse {
        factures: rows
            .into_iter()
            .map(InvoiceResponse::try_from)
            .collect::<Result<_, _>>()?,
        pagination: PageMeta::new(page, total),
    }))
}

/// POST `/factures` - Create an invoice.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceResponse>)> {
    let input = NewInvoice::parse(body.into(), Utc::now().date_naive())?;
    let repo = InvoiceRepository::new((*state.db).clone());
    let model = repo
        .create_invoice(auth.agency_id(), auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::try_from(model)?)))
}

/// GET `/factures/{id}` - Get one invoice.
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<InvoiceResponse>> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let model = repo.get_invoice(auth.agency_id(), id).await?;
    Ok(Json(InvoiceResponse::try_from(model)?))
}

/// PUT `/factures/{id}/annuler` - Cancel an unpaid invoice.
async fn cancel_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<InvoiceResponse>> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let model = repo.cancel_invoice(auth.agency_id(), id).await?;
    Ok(Json(InvoiceResponse::try_from(model)?))
}

/// GET `/factures/statistiques` - Counts and amounts per effective status.
async fn get_statistics(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<InvoiceStatisticsQuery>,
) -> ApiResult<Json<InvoiceStatistics>> {
    let kind = invoice_field("kind", query.kind.as_deref())?;
    let repo = InvoiceRepository::new((*state.db).clone());
    Ok(Json(repo.statistics(auth.agency_id(), kind).await?))
}

/// POST `/factures/{id}/paiements` - Pay an invoice through the register.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<PaymentResponse>)> {
    let amount = body.montant.ok_or(InvoiceError::MissingField("montant"))?;
    let input = InvoicePaymentInput {
        amount,
        payment_mode: parse_param("modePaiement", body.mode_paiement.as_deref())?
            .unwrap_or(PaymentMode::Especes),
        date: body.date.unwrap_or_else(|| Utc::now().date_naive()),
        reference: body
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    let recorded = repo
        .record_payment(auth.agency_id(), auth.user_id(), id, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            facture: InvoiceResponse::try_from(recorded.invoice)?,
            operation: recorded.operation.into(),
        }),
    ))
}
