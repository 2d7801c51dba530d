//! Invoice repository.
//!
//! Status filters and statistics always go through
//! `agencia_core::invoice::derive_status`; the stored `statut` column is
//! never compared directly except for `annulee`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use agencia_core::caisse::PaymentMode;
use agencia_core::invoice::{
    check_cancel, plan_payment, statistics, Counterparty, InvoiceAmounts, InvoiceError,
    InvoiceKind, InvoiceStatistics, InvoiceStatus, NewInvoice,
};
use agencia_shared::types::PageRequest;

use super::caisse::{insert_operation, OperationRow};
use super::error::{parse_column, RepositoryError};
use crate::entities::{cash_operations, clients, invoices, suppliers};

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Effective (derived) status.
    pub status: Option<InvoiceStatus>,
    /// Client or supplier invoices.
    pub kind: Option<InvoiceKind>,
    /// Only this client's invoices.
    pub client_id: Option<Uuid>,
    /// Only this supplier's invoices.
    pub supplier_id: Option<Uuid>,
}

/// Input for a payment against an invoice.
#[derive(Debug, Clone)]
pub struct InvoicePaymentInput {
    /// Amount paid.
    pub amount: Decimal,
    /// Payment mode.
    pub payment_mode: PaymentMode,
    /// Value date.
    pub date: NaiveDate,
    /// Optional reference.
    pub reference: Option<String>,
}

/// A payment and the register row it produced.
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    /// Invoice after the payment.
    pub invoice: invoices::Model,
    /// Register row.
    pub operation: cash_operations::Model,
}

/// Reads the amounts the invoice rules need from a stored row.
pub fn invoice_amounts(model: &invoices::Model) -> Result<InvoiceAmounts, RepositoryError> {
    Ok(InvoiceAmounts {
        kind: parse_column(model.id, &model.kind)?,
        montant_ttc: model.montant_ttc,
        montant_paye: model.montant_paye,
        statut: parse_column(model.id, &model.statut)?,
    })
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an invoice after checking its counterparty and number.
    pub async fn create_invoice(
        &self,
        agency_id: Uuid,
        user_id: Uuid,
        input: NewInvoice,
    ) -> Result<invoices::Model, RepositoryError> {
        let (client_id, supplier_id) = match input.counterparty {
            Counterparty::Client(id) => {
                let id = id.into_inner();
                clients::Entity::find_by_id(id)
                    .filter(clients::Column::AgencyId.eq(agency_id))
                    .one(&self.db)
                    .await?
                    .ok_or(InvoiceError::CounterpartyNotFound(id))?;
                (Some(id), None)
            }
            Counterparty::Supplier(id) => {
                let id = id.into_inner();
                suppliers::Entity::find_by_id(id)
                    .filter(suppliers::Column::AgencyId.eq(agency_id))
                    .one(&self.db)
                    .await?
                    .ok_or(InvoiceError::CounterpartyNotFound(id))?;
                (None, Some(id))
            }
        };

        let duplicate = invoices::Entity::find()
            .filter(invoices::Column::AgencyId.eq(agency_id))
            .filter(invoices::Column::Numero.eq(input.numero.as_str()))
            .one(&self.db)
            .await?;
        if duplicate.is_some() {
            return Err(InvoiceError::DuplicateNumber(input.numero).into());
        }

        let now = Utc::now().into();
        let model = invoices::ActiveModel {
            id: Set(Uuid::now_v7()),
            agency_id: Set(agency_id),
            numero: Set(input.numero),
            kind: Set(input.counterparty.kind().as_str().to_string()),
            client_id: Set(client_id),
            fournisseur_id: Set(supplier_id),
            montant_ht: Set(input.montant_ht),
            montant_ttc: Set(input.montant_ttc),
            montant_paye: Set(Decimal::ZERO),
            statut: Set(input.statut.as_str().to_string()),
            date_emission: Set(input.date_emission),
            date_echeance: Set(input.date_echeance),
            created_by: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(agency_id = %agency_id, invoice_id = %model.id, numero = %model.numero, "invoice created");
        Ok(model)
    }

    /// Lists invoices matching the filter, newest first, with the total
    /// count. Without a status filter the page is cut in SQL; the derived
    /// status is only known after loading, so a status filter pages in memory.
    pub async fn list_invoices(
        &self,
        agency_id: Uuid,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> Result<(Vec<invoices::Model>, u64), RepositoryError> {
        let query = filtered_query(agency_id, filter);
        let Some(wanted) = filter.status else {
            let total = query.clone().count(&self.db).await?;
            let rows = query
                .offset(page.offset())
                .limit(page.limit)
                .all(&self.db)
                .await?;
            return Ok((rows, total));
        };

        let mut matching = Vec::new();
        for model in query.all(&self.db).await? {
            if invoice_amounts(&model)?.status() == wanted {
                matching.push(model);
            }
        }

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let rows = matching.into_iter().skip(offset).take(limit).collect();
        Ok((rows, total))
    }

    /// Gets one invoice.
    pub async fn get_invoice(
        &self,
        agency_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<invoices::Model, RepositoryError> {
        find_invoice(&self.db, agency_id, invoice_id).await
    }

    /// Marks an unpaid invoice as cancelled.
    pub async fn cancel_invoice(
        &self,
        agency_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<invoices::Model, RepositoryError> {
        let invoice = find_invoice(&self.db, agency_id, invoice_id).await?;
        check_cancel(&invoice_amounts(&invoice)?)?;

        let result = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::Statut,
                Expr::value(InvoiceStatus::Annulee.as_str()),
            )
            .col_expr(
                invoices::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::AgencyId.eq(agency_id))
            .filter(invoices::Column::MontantPaye.lte(Decimal::ZERO))
            .filter(invoices::Column::Statut.ne(InvoiceStatus::Annulee.as_str()))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(InvoiceError::HasPayments.into());
        }

        tracing::info!(agency_id = %agency_id, invoice_id = %invoice_id, "invoice cancelled");
        find_invoice(&self.db, agency_id, invoice_id).await
    }

    /// Aggregates invoices by effective status.
    pub async fn statistics(
        &self,
        agency_id: Uuid,
        kind: Option<InvoiceKind>,
    ) -> Result<InvoiceStatistics, RepositoryError> {
        let filter = InvoiceFilter {
            kind,
            ..InvoiceFilter::default()
        };
        let amounts = filtered_query(agency_id, &filter)
            .all(&self.db)
            .await?
            .iter()
            .map(invoice_amounts)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statistics(&amounts))
    }

    /// Records a payment: raises `montant_paye` and writes the register row
    /// in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The invoice is missing or cancelled
    /// - The amount exceeds what remains due
    /// - Database operation fails
    pub async fn record_payment(
        &self,
        agency_id: Uuid,
        user_id: Uuid,
        invoice_id: Uuid,
        input: InvoicePaymentInput,
    ) -> Result<RecordedPayment, RepositoryError> {
        let txn = self.db.begin().await?;

        let invoice = find_invoice(&txn, agency_id, invoice_id).await?;
        let amounts = invoice_amounts(&invoice)?;
        let plan = plan_payment(&amounts, input.amount)?;

        let result = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::MontantPaye,
                Expr::col(invoices::Column::MontantPaye).add(plan.amount),
            )
            .col_expr(
                invoices::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::AgencyId.eq(agency_id))
            .filter(invoices::Column::Statut.ne(InvoiceStatus::Annulee.as_str()))
            .filter(
                Expr::col(invoices::Column::MontantTtc)
                    .gte(Expr::col(invoices::Column::MontantPaye).add(plan.amount)),
            )
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            let current = invoice_amounts(&find_invoice(&txn, agency_id, invoice_id).await?)?;
            return Err(InvoiceError::Overpayment {
                remaining: current.remaining(),
            }
            .into());
        }

        let operation = insert_operation(
            &txn,
            OperationRow {
                agency_id,
                op_type: plan.op_type,
                category: plan.category,
                amount: plan.amount,
                description: format!("Paiement facture {}", invoice.numero),
                payment_mode: input.payment_mode,
                date: input.date,
                reference: input.reference,
                agent_id: None,
                client_id: invoice.client_id,
                supplier_id: invoice.fournisseur_id,
                invoice_id: Some(invoice.id),
                remission: None,
                created_by: user_id,
            },
        )
        .await?;

        let invoice = find_invoice(&txn, agency_id, invoice_id).await?;
        txn.commit().await?;

        tracing::info!(
            agency_id = %agency_id,
            invoice_id = %invoice_id,
            operation_id = %operation.id,
            montant = %plan.amount,
            "invoice payment recorded"
        );
        Ok(RecordedPayment { invoice, operation })
    }
}

fn filtered_query(agency_id: Uuid, filter: &InvoiceFilter) -> Select<invoices::Entity> {
    let mut query = invoices::Entity::find().filter(invoices::Column::AgencyId.eq(agency_id));
    if let Some(kind) = filter.kind {
        query = query.filter(invoices::Column::Kind.eq(kind.as_str()));
    }
    if let Some(client_id) = filter.client_id {
        query = query.filter(invoices::Column::ClientId.eq(client_id));
    }
    if let Some(supplier_id) = filter.supplier_id {
        query = query.filter(invoices::Column::FournisseurId.eq(supplier_id));
    }
    query
        .order_by_desc(invoices::Column::DateEmission)
        .order_by_desc(invoices::Column::CreatedAt)
}

async fn find_invoice<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    invoice_id: Uuid,
) -> Result<invoices::Model, RepositoryError> {
    invoices::Entity::find_by_id(invoice_id)
        .filter(invoices::Column::AgencyId.eq(agency_id))
        .one(conn)
        .await?
        .ok_or_else(|| InvoiceError::NotFound(invoice_id).into())
}
