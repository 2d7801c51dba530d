//! Cancel, edit and delete rules for persisted operations.

use rust_decimal::Decimal;

use agencia_shared::types::{ClientId, InvoiceId, SupplierId};

use super::category::CashCategory;
use super::classify::LedgerEffect;
use super::error::CaisseError;
use super::request::RemissionType;

/// What the rules need to know about a stored operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSnapshot {
    /// Recorded category.
    pub category: CashCategory,
    /// Amount.
    pub amount: Decimal,
    /// Already cancelled.
    pub cancelled: bool,
    /// Remission type recorded at creation.
    pub remission: Option<RemissionType>,
    /// Linked supplier.
    pub supplier_id: Option<SupplierId>,
    /// Linked client.
    pub client_id: Option<ClientId>,
    /// Linked invoice.
    pub invoice_id: Option<InvoiceId>,
}

impl OperationSnapshot {
    /// Rebuilds the balance effect applied when the row was created.
    #[must_use]
    pub fn ledger_effect(&self) -> LedgerEffect {
        match (self.category, self.remission) {
            (CashCategory::RemboursementFournisseurRemise, Some(RemissionType::Dette)) => {
                self.supplier_id
                    .map_or(LedgerEffect::CashOnly, |supplier_id| LedgerEffect::SupplierDebt {
                        supplier_id,
                    })
            }
            (CashCategory::RemboursementFournisseurRemise, _) => self
                .supplier_id
                .map_or(LedgerEffect::CashOnly, |supplier_id| LedgerEffect::SupplierCredit {
                    supplier_id,
                }),
            (CashCategory::RemboursementClientRemise, _) => self
                .client_id
                .map_or(LedgerEffect::CashOnly, |client_id| LedgerEffect::ClientCredit {
                    client_id,
                }),
            (CashCategory::RemboursementClient, _) => self
                .invoice_id
                .map_or(LedgerEffect::CashOnly, |invoice_id| LedgerEffect::InvoiceRefund {
                    invoice_id,
                }),
            (
                CashCategory::EncaissementFactureClient | CashCategory::ReglementFactureFournisseur,
                _,
            ) => self
                .invoice_id
                .map_or(LedgerEffect::CashOnly, |invoice_id| LedgerEffect::InvoicePayment {
                    invoice_id,
                }),
            _ => LedgerEffect::CashOnly,
        }
    }

    /// True for rows a cashier created, including remission traces.
    #[must_use]
    pub const fn is_desk_operation(&self) -> bool {
        self.category.is_manual() || self.category.is_remission()
    }
}

/// Ledger write that undoes an operation's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversal {
    /// Only the row changes.
    None,
    /// Add the amount back to a supplier's `soldeCrediteur`.
    RestoreSupplierCredit {
        /// Supplier.
        supplier_id: SupplierId,
        /// Amount to add back.
        amount: Decimal,
    },
    /// Add the amount back to a supplier's `detteFournisseur`.
    RestoreSupplierDebt {
        /// Supplier.
        supplier_id: SupplierId,
        /// Amount to add back.
        amount: Decimal,
    },
    /// Add the amount back to a client's `soldeCrediteur`.
    RestoreClientCredit {
        /// Client.
        client_id: ClientId,
        /// Amount to add back.
        amount: Decimal,
    },
    /// Add a refunded amount back to an invoice's `montantPaye`.
    RestoreInvoicePaid {
        /// Invoice.
        invoice_id: InvoiceId,
        /// Amount to add back.
        amount: Decimal,
    },
}

/// Checks that an operation can be cancelled and returns the write that
/// undoes its ledger effect.
pub fn plan_cancellation(snapshot: &OperationSnapshot) -> Result<Reversal, CaisseError> {
    if snapshot.cancelled {
        return Err(CaisseError::AlreadyCancelled);
    }
    if !snapshot.is_desk_operation() {
        return Err(CaisseError::NotManual);
    }

    let amount = snapshot.amount;
    Ok(match snapshot.ledger_effect() {
        LedgerEffect::CashOnly | LedgerEffect::InvoicePayment { .. } => Reversal::None,
        LedgerEffect::SupplierCredit { supplier_id } => Reversal::RestoreSupplierCredit {
            supplier_id,
            amount,
        },
        LedgerEffect::SupplierDebt { supplier_id } => Reversal::RestoreSupplierDebt {
            supplier_id,
            amount,
        },
        LedgerEffect::ClientCredit { client_id } => Reversal::RestoreClientCredit {
            client_id,
            amount,
        },
        LedgerEffect::InvoiceRefund { invoice_id } => Reversal::RestoreInvoicePaid {
            invoice_id,
            amount,
        },
    })
}

/// Checks an edit. `new_amount` is set when the caller wants to change the
/// amount; the other editable fields carry no ledger meaning.
pub fn check_edit(
    snapshot: &OperationSnapshot,
    new_amount: Option<Decimal>,
) -> Result<(), CaisseError> {
    if snapshot.cancelled {
        return Err(CaisseError::AlreadyCancelled);
    }
    let Some(amount) = new_amount else {
        return Ok(());
    };
    if amount <= Decimal::ZERO {
        return Err(CaisseError::NonPositiveAmount);
    }
    if amount == snapshot.amount {
        return Ok(());
    }
    if snapshot.ledger_effect().touches_ledger() {
        return Err(CaisseError::LinkedAmountEdit);
    }
    if !snapshot.category.is_manual() {
        return Err(CaisseError::NotManual);
    }
    Ok(())
}

/// Checks that a row can be physically deleted without orphaning a ledger
/// balance change. Permission is checked by the caller.
pub fn check_delete(snapshot: &OperationSnapshot) -> Result<(), CaisseError> {
    if snapshot.cancelled || !snapshot.ledger_effect().touches_ledger() {
        return Ok(());
    }
    Err(CaisseError::DeleteRequiresCancel)
}
