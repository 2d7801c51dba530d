//! Cash register repository.
//!
//! Every mutation runs in one database transaction. Ledger balances are
//! moved with conditional UPDATE statements, never read-modify-write, so an
//! operation either lands together with its single balance effect or not at
//! all.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use agencia_core::caisse::{
    check_delete, check_edit, classify, ensure_refundable, plan_cancellation, statistics,
    CaisseError, CashCategory, CashLine, CashSummary, CategoryLink, LedgerEffect, OperationRequest,
    OperationSnapshot, OperationType, PaymentMode, PeriodStatistics, RemissionType, Reversal,
    StatisticsWindow,
};
use agencia_core::invoice::{remaining, InvoiceKind};
use agencia_shared::types::{ClientId, InvoiceId, PageRequest, SupplierId};

use super::agent::find_agent;
use super::client::{adjust_client_credit, find_client};
use super::error::{parse_column, RepositoryError};
use super::supplier::{
    find_supplier, restore_supplier_balance, settle_supplier_balance, SupplierBalance,
};
use crate::entities::{cash_operations, invoices};

/// Filter options for listing and totalling operations.
#[derive(Debug, Clone, Default)]
pub struct CashOperationFilter {
    /// Earliest value date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest value date, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Category.
    pub category: Option<CashCategory>,
    /// Payment mode.
    pub payment_mode: Option<PaymentMode>,
    /// Direction.
    pub op_type: Option<OperationType>,
}

/// Editable fields of an operation.
#[derive(Debug, Clone, Default)]
pub struct OperationUpdate {
    /// New description.
    pub description: Option<String>,
    /// New reference; blank clears it.
    pub reference: Option<String>,
    /// New value date.
    pub date: Option<NaiveDate>,
    /// New payment mode.
    pub payment_mode: Option<PaymentMode>,
    /// New amount, only for unlinked operations.
    pub amount: Option<Decimal>,
}

/// Row values for a new operation.
#[derive(Debug, Clone)]
pub(crate) struct OperationRow {
    pub agency_id: Uuid,
    pub op_type: OperationType,
    pub category: CashCategory,
    pub amount: Decimal,
    pub description: String,
    pub payment_mode: PaymentMode,
    pub date: NaiveDate,
    pub reference: Option<String>,
    pub agent_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub remission: Option<RemissionType>,
    pub created_by: Uuid,
}

/// Inserts an operation row.
pub(crate) async fn insert_operation<C: ConnectionTrait>(
    conn: &C,
    row: OperationRow,
) -> Result<cash_operations::Model, RepositoryError> {
    let now = Utc::now().into();
    let model = cash_operations::ActiveModel {
        id: Set(Uuid::now_v7()),
        agency_id: Set(row.agency_id),
        type_operation: Set(row.op_type.as_str().to_string()),
        montant: Set(row.amount),
        description: Set(row.description),
        categorie: Set(row.category.as_str().to_string()),
        mode_paiement: Set(row.payment_mode.as_str().to_string()),
        date: Set(row.date),
        reference: Set(row.reference),
        agent_id: Set(row.agent_id),
        client_id: Set(row.client_id),
        fournisseur_id: Set(row.supplier_id),
        facture_id: Set(row.invoice_id),
        remboursement_type: Set(row.remission.map(|r| r.as_str().to_string())),
        annulee: Set(false),
        annulee_le: Set(None),
        annulee_par: Set(None),
        created_by: Set(row.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;
    Ok(model)
}

/// Maps a stored row to an aggregation line.
pub fn cash_line(model: &cash_operations::Model) -> Result<CashLine, RepositoryError> {
    Ok(CashLine {
        op_type: parse_column(model.id, &model.type_operation)?,
        category: parse_column(model.id, &model.categorie)?,
        payment_mode: parse_column(model.id, &model.mode_paiement)?,
        date: model.date,
        amount: model.montant,
        cancelled: model.annulee,
    })
}

/// Maps a stored row to what the lifecycle rules look at.
pub fn snapshot(model: &cash_operations::Model) -> Result<OperationSnapshot, RepositoryError> {
    Ok(OperationSnapshot {
        category: parse_column(model.id, &model.categorie)?,
        amount: model.montant,
        cancelled: model.annulee,
        remission: model
            .remboursement_type
            .as_deref()
            .map(|raw| parse_column(model.id, raw))
            .transpose()?,
        supplier_id: model.fournisseur_id.map(SupplierId::from_uuid),
        client_id: model.client_id.map(ClientId::from_uuid),
        invoice_id: model.facture_id.map(InvoiceId::from_uuid),
    })
}

fn apply_filter(
    mut query: Select<cash_operations::Entity>,
    filter: &CashOperationFilter,
) -> Select<cash_operations::Entity> {
    if let Some(from) = filter.date_from {
        query = query.filter(cash_operations::Column::Date.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(cash_operations::Column::Date.lte(to));
    }
    if let Some(category) = filter.category {
        query = query.filter(cash_operations::Column::Categorie.eq(category.as_str()));
    }
    if let Some(mode) = filter.payment_mode {
        query = query.filter(cash_operations::Column::ModePaiement.eq(mode.as_str()));
    }
    if let Some(op_type) = filter.op_type {
        query = query.filter(cash_operations::Column::TypeOperation.eq(op_type.as_str()));
    }
    query
}

/// Linked row IDs resolved for a request.
#[derive(Debug, Default)]
struct ResolvedLinks {
    agent_id: Option<Uuid>,
    client_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    invoice_id: Option<Uuid>,
}

/// Cash register repository.
#[derive(Debug, Clone)]
pub struct CaisseRepository {
    db: DatabaseConnection,
}

impl CaisseRepository {
    /// Creates a new caisse repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a desk operation together with its single balance effect.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A linked agent, client, supplier or invoice is missing
    /// - The invoice belongs to another client
    /// - A remission exceeds the targeted balance
    /// - Database operation fails
    pub async fn create_operation(
        &self,
        agency_id: Uuid,
        user_id: Uuid,
        request: OperationRequest,
    ) -> Result<cash_operations::Model, RepositoryError> {
        let plan = classify(&request);
        let txn = self.db.begin().await?;

        let links = resolve_links(&txn, agency_id, &request.link).await?;
        apply_effect(&txn, agency_id, plan.effect, request.amount).await?;

        let model = insert_operation(
            &txn,
            OperationRow {
                agency_id,
                op_type: plan.recorded_category.operation_type(),
                category: plan.recorded_category,
                amount: request.amount,
                description: request.description,
                payment_mode: request.payment_mode,
                date: request.date,
                reference: request.reference,
                agent_id: links.agent_id,
                client_id: links.client_id,
                supplier_id: links.supplier_id,
                invoice_id: links.invoice_id,
                remission: plan.remission,
                created_by: user_id,
            },
        )
        .await?;

        txn.commit().await?;

        tracing::info!(
            agency_id = %agency_id,
            operation_id = %model.id,
            categorie = %plan.recorded_category,
            montant = %model.montant,
            counted = plan.is_counted(),
            "cash operation recorded"
        );
        Ok(model)
    }

    /// Lists operations, newest first, with the total row count.
    pub async fn list_operations(
        &self,
        agency_id: Uuid,
        filter: &CashOperationFilter,
        page: PageRequest,
    ) -> Result<(Vec<cash_operations::Model>, u64), RepositoryError> {
        let query = apply_filter(
            cash_operations::Entity::find()
                .filter(cash_operations::Column::AgencyId.eq(agency_id)),
            filter,
        );

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(cash_operations::Column::Date)
            .order_by_desc(cash_operations::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Register totals over the filtered operations.
    pub async fn summary(
        &self,
        agency_id: Uuid,
        filter: &CashOperationFilter,
    ) -> Result<CashSummary, RepositoryError> {
        let lines = self.lines(agency_id, filter).await?;
        Ok(CashSummary::from_lines(&lines))
    }

    /// Statistics over a date window.
    pub async fn statistics(
        &self,
        agency_id: Uuid,
        window: StatisticsWindow,
    ) -> Result<PeriodStatistics, RepositoryError> {
        let filter = CashOperationFilter {
            date_from: Some(window.start),
            date_to: Some(window.end),
            ..CashOperationFilter::default()
        };
        let lines = self.lines(agency_id, &filter).await?;
        Ok(statistics::compute(window, &lines))
    }

    async fn lines(
        &self,
        agency_id: Uuid,
        filter: &CashOperationFilter,
    ) -> Result<Vec<CashLine>, RepositoryError> {
        apply_filter(
            cash_operations::Entity::find()
                .filter(cash_operations::Column::AgencyId.eq(agency_id))
                .filter(cash_operations::Column::Annulee.eq(false)),
            filter,
        )
        .all(&self.db)
        .await?
        .iter()
        .map(cash_line)
        .collect()
    }

    /// Gets one operation.
    pub async fn get_operation(
        &self,
        agency_id: Uuid,
        operation_id: Uuid,
    ) -> Result<cash_operations::Model, RepositoryError> {
        find_operation(&self.db, agency_id, operation_id).await
    }

    /// Edits descriptive fields, and the amount of unlinked operations.
    pub async fn update_operation(
        &self,
        agency_id: Uuid,
        operation_id: Uuid,
        update: OperationUpdate,
    ) -> Result<cash_operations::Model, RepositoryError> {
        let operation = find_operation(&self.db, agency_id, operation_id).await?;
        check_edit(&snapshot(&operation)?, update.amount)?;

        let mut active: cash_operations::ActiveModel = operation.into();
        if let Some(description) = update.description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(CaisseError::MissingField("description").into());
            }
            active.description = Set(description);
        }
        if let Some(reference) = update.reference {
            let reference = reference.trim().to_string();
            active.reference = Set((!reference.is_empty()).then_some(reference));
        }
        if let Some(date) = update.date {
            active.date = Set(date);
        }
        if let Some(mode) = update.payment_mode {
            active.mode_paiement = Set(mode.as_str().to_string());
        }
        if let Some(amount) = update.amount {
            active.montant = Set(amount);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(agency_id = %agency_id, operation_id = %operation_id, "cash operation edited");
        Ok(updated)
    }

    /// Cancels a desk operation and reverts its ledger effect.
    pub async fn cancel_operation(
        &self,
        agency_id: Uuid,
        operation_id: Uuid,
        user_id: Uuid,
    ) -> Result<cash_operations::Model, RepositoryError> {
        let txn = self.db.begin().await?;

        let operation = find_operation(&txn, agency_id, operation_id).await?;
        let reversal = plan_cancellation(&snapshot(&operation)?)?;

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let flagged = cash_operations::Entity::update_many()
            .col_expr(cash_operations::Column::Annulee, Expr::value(true))
            .col_expr(cash_operations::Column::AnnuleeLe, Expr::value(now))
            .col_expr(cash_operations::Column::AnnuleePar, Expr::value(user_id))
            .col_expr(cash_operations::Column::UpdatedAt, Expr::value(now))
            .filter(cash_operations::Column::Id.eq(operation_id))
            .filter(cash_operations::Column::AgencyId.eq(agency_id))
            .filter(cash_operations::Column::Annulee.eq(false))
            .exec(&txn)
            .await?;
        if flagged.rows_affected == 0 {
            return Err(CaisseError::AlreadyCancelled.into());
        }

        apply_reversal(&txn, agency_id, reversal).await?;
        let cancelled = find_operation(&txn, agency_id, operation_id).await?;
        txn.commit().await?;

        tracing::info!(
            agency_id = %agency_id,
            operation_id = %operation_id,
            reversal = ?reversal,
            "cash operation cancelled"
        );
        Ok(cancelled)
    }

    /// Physically deletes an operation that carries no live ledger effect.
    pub async fn delete_operation(
        &self,
        agency_id: Uuid,
        operation_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let operation = find_operation(&self.db, agency_id, operation_id).await?;
        check_delete(&snapshot(&operation)?)?;

        cash_operations::Entity::delete_by_id(operation_id)
            .filter(cash_operations::Column::AgencyId.eq(agency_id))
            .exec(&self.db)
            .await?;

        tracing::warn!(agency_id = %agency_id, operation_id = %operation_id, "cash operation deleted");
        Ok(())
    }
}

async fn find_operation<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    operation_id: Uuid,
) -> Result<cash_operations::Model, RepositoryError> {
    cash_operations::Entity::find_by_id(operation_id)
        .filter(cash_operations::Column::AgencyId.eq(agency_id))
        .one(conn)
        .await?
        .ok_or_else(|| CaisseError::OperationNotFound(operation_id).into())
}

/// Checks that every linked row exists in the agency.
async fn resolve_links<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    link: &CategoryLink,
) -> Result<ResolvedLinks, RepositoryError> {
    match *link {
        CategoryLink::Unlinked => Ok(ResolvedLinks::default()),
        CategoryLink::Agent { agent_id } => {
            let agent = find_agent(conn, agency_id, agent_id.into_inner()).await?;
            Ok(ResolvedLinks {
                agent_id: Some(agent.id),
                ..ResolvedLinks::default()
            })
        }
        CategoryLink::SupplierRefund { supplier_id, .. }
        | CategoryLink::SupplierAdvance { supplier_id } => {
            let supplier = find_supplier(conn, agency_id, supplier_id.into_inner()).await?;
            Ok(ResolvedLinks {
                supplier_id: Some(supplier.id),
                ..ResolvedLinks::default()
            })
        }
        CategoryLink::ClientRefund {
            client_id,
            invoice_id,
            ..
        } => {
            let client = find_client(conn, agency_id, client_id.into_inner()).await?;
            let invoice_id = match invoice_id {
                None => None,
                Some(invoice_id) => {
                    let invoice = find_invoice_row(conn, agency_id, invoice_id.into_inner()).await?;
                    let is_client_invoice = invoice.kind == InvoiceKind::Client.as_str();
                    if !is_client_invoice || invoice.client_id != Some(client.id) {
                        return Err(CaisseError::InvoiceCounterpartyMismatch(invoice.id).into());
                    }
                    Some(invoice.id)
                }
            };
            Ok(ResolvedLinks {
                client_id: Some(client.id),
                invoice_id,
                ..ResolvedLinks::default()
            })
        }
    }
}

async fn find_invoice_row<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    invoice_id: Uuid,
) -> Result<invoices::Model, RepositoryError> {
    invoices::Entity::find_by_id(invoice_id)
        .filter(invoices::Column::AgencyId.eq(agency_id))
        .one(conn)
        .await?
        .ok_or_else(|| CaisseError::InvoiceNotFound(invoice_id).into())
}

/// Applies the one balance change an operation carries.
async fn apply_effect<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    effect: LedgerEffect,
    amount: Decimal,
) -> Result<(), RepositoryError> {
    match effect {
        LedgerEffect::CashOnly | LedgerEffect::InvoicePayment { .. } => Ok(()),
        LedgerEffect::SupplierCredit { supplier_id } => {
            settle_supplier_balance(
                conn,
                agency_id,
                supplier_id.into_inner(),
                SupplierBalance::Credit,
                amount,
            )
            .await
        }
        LedgerEffect::SupplierDebt { supplier_id } => {
            settle_supplier_balance(
                conn,
                agency_id,
                supplier_id.into_inner(),
                SupplierBalance::Debt,
                amount,
            )
            .await
        }
        LedgerEffect::ClientCredit { client_id } => {
            adjust_client_credit(conn, agency_id, client_id.into_inner(), -amount).await
        }
        LedgerEffect::InvoiceRefund { invoice_id } => {
            let invoice_id = invoice_id.into_inner();
            let result = invoices::Entity::update_many()
                .col_expr(
                    invoices::Column::MontantPaye,
                    Expr::col(invoices::Column::MontantPaye).sub(amount),
                )
                .filter(invoices::Column::Id.eq(invoice_id))
                .filter(invoices::Column::AgencyId.eq(agency_id))
                .filter(invoices::Column::MontantPaye.gte(amount))
                .exec(conn)
                .await?;
            if result.rows_affected > 0 {
                return Ok(());
            }
            let invoice = find_invoice_row(conn, agency_id, invoice_id).await?;
            ensure_refundable(invoice.montant_paye, amount)?;
            Err(CaisseError::RefundExceedsPaid {
                paid: invoice.montant_paye,
            }
            .into())
        }
    }
}

/// Undoes a cancelled operation's balance change.
async fn apply_reversal<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    reversal: Reversal,
) -> Result<(), RepositoryError> {
    match reversal {
        Reversal::None => Ok(()),
        Reversal::RestoreSupplierCredit {
            supplier_id,
            amount,
        } => {
            restore_supplier_balance(
                conn,
                agency_id,
                supplier_id.into_inner(),
                SupplierBalance::Credit,
                amount,
            )
            .await
        }
        Reversal::RestoreSupplierDebt {
            supplier_id,
            amount,
        } => {
            restore_supplier_balance(
                conn,
                agency_id,
                supplier_id.into_inner(),
                SupplierBalance::Debt,
                amount,
            )
            .await
        }
        Reversal::RestoreClientCredit { client_id, amount } => {
            adjust_client_credit(conn, agency_id, client_id.into_inner(), amount).await
        }
        Reversal::RestoreInvoicePaid { invoice_id, amount } => {
            let invoice_id = invoice_id.into_inner();
            let result = invoices::Entity::update_many()
                .col_expr(
                    invoices::Column::MontantPaye,
                    Expr::col(invoices::Column::MontantPaye).add(amount),
                )
                .filter(invoices::Column::Id.eq(invoice_id))
                .filter(invoices::Column::AgencyId.eq(agency_id))
                .filter(
                    Expr::col(invoices::Column::MontantTtc)
                        .gte(Expr::col(invoices::Column::MontantPaye).add(amount)),
                )
                .exec(conn)
                .await?;
            if result.rows_affected > 0 {
                return Ok(());
            }
            let invoice = find_invoice_row(conn, agency_id, invoice_id).await?;
            Err(CaisseError::RefundCancelWouldOverpay {
                remaining: remaining(invoice.montant_ttc, invoice.montant_paye),
            }
            .into())
        }
    }
}
