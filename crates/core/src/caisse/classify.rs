//! Operation classifier.
//!
//! Decides, for a validated request, which single balance the operation
//! touches: the register itself, an invoice's paid amount, or one of the
//! counterparty ledger balances.

use rust_decimal::Decimal;
use serde::Serialize;

use agencia_shared::types::{ClientId, InvoiceId, SupplierId};

use super::category::CashCategory;
use super::error::CaisseError;
use super::request::{CategoryLink, OperationRequest, RemissionType};

/// The balance an operation moves besides (or instead of) the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEffect {
    /// Counted register movement and nothing else.
    CashOnly,
    /// Counted register movement that raised an invoice's paid amount.
    InvoicePayment {
        /// Paid invoice.
        invoice_id: InvoiceId,
    },
    /// Counted refund that lowered an invoice's paid amount.
    InvoiceRefund {
        /// Refunded invoice.
        invoice_id: InvoiceId,
    },
    /// Non-counted: supplier `soldeCrediteur` decreased.
    SupplierCredit {
        /// Supplier whose credit is settled.
        supplier_id: SupplierId,
    },
    /// Non-counted: supplier `detteFournisseur` decreased.
    SupplierDebt {
        /// Supplier whose debt is settled.
        supplier_id: SupplierId,
    },
    /// Non-counted: client `soldeCrediteur` decreased.
    ClientCredit {
        /// Client whose credit is settled.
        client_id: ClientId,
    },
}

impl LedgerEffect {
    /// True when the register itself moves.
    #[must_use]
    pub const fn moves_cash(&self) -> bool {
        matches!(
            self,
            Self::CashOnly | Self::InvoicePayment { .. } | Self::InvoiceRefund { .. }
        )
    }

    /// True when something outside the operation row changed.
    #[must_use]
    pub const fn touches_ledger(&self) -> bool {
        !matches!(self, Self::CashOnly)
    }
}

/// What to persist for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPlan {
    /// Category written on the operation row.
    pub recorded_category: CashCategory,
    /// Remission type written on the row, when one applies.
    pub remission: Option<RemissionType>,
    /// The one balance this operation moves.
    pub effect: LedgerEffect,
}

impl OperationPlan {
    /// True when the recorded row counts toward register totals.
    #[must_use]
    pub const fn is_counted(&self) -> bool {
        self.recorded_category.is_counted()
    }
}

/// Maps a validated request to its single balance effect.
///
/// A remission rewrites the category to its non-counted trace so the row
/// stays visible in the journal without moving the register.
#[must_use]
pub fn classify(request: &OperationRequest) -> OperationPlan {
    let cash = |remission| OperationPlan {
        recorded_category: request.category,
        remission,
        effect: LedgerEffect::CashOnly,
    };
    let trace = |remission, effect| OperationPlan {
        recorded_category: request
            .category
            .remission_trace()
            .unwrap_or(request.category),
        remission: Some(remission),
        effect,
    };

    match request.link {
        CategoryLink::Unlinked | CategoryLink::Agent { .. } | CategoryLink::SupplierAdvance { .. } => {
            cash(None)
        }
        CategoryLink::SupplierRefund {
            supplier_id,
            remission,
        } => match remission {
            RemissionType::Solde => trace(remission, LedgerEffect::SupplierCredit { supplier_id }),
            RemissionType::Dette => trace(remission, LedgerEffect::SupplierDebt { supplier_id }),
            RemissionType::Exceptionnel => cash(Some(remission)),
        },
        CategoryLink::ClientRefund {
            client_id,
            invoice_id,
            remission,
        } => match (remission, invoice_id) {
            (RemissionType::Solde, _) => trace(remission, LedgerEffect::ClientCredit { client_id }),
            (_, Some(invoice_id)) => OperationPlan {
                recorded_category: request.category,
                remission: Some(RemissionType::Exceptionnel),
                effect: LedgerEffect::InvoiceRefund { invoice_id },
            },
            (_, None) => cash(Some(RemissionType::Exceptionnel)),
        },
    }
}

/// Rejects a remission larger than the balance it settles.
pub fn ensure_covers(available: Decimal, requested: Decimal) -> Result<(), CaisseError> {
    if requested > available {
        return Err(CaisseError::InsufficientBalance {
            available,
            requested,
        });
    }
    Ok(())
}

/// Rejects a refund larger than what was paid on the invoice.
pub fn ensure_refundable(paid: Decimal, requested: Decimal) -> Result<(), CaisseError> {
    if requested > paid {
        return Err(CaisseError::RefundExceedsPaid { paid });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caisse::category::{OperationType, PaymentMode};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn request(category: CashCategory, link: CategoryLink) -> OperationRequest {
        OperationRequest {
            op_type: category.operation_type(),
            category,
            amount: dec!(3000),
            description: "test".to_string(),
            payment_mode: PaymentMode::Especes,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            reference: None,
            link,
        }
    }

    #[test]
    fn test_unlinked_is_cash() {
        let plan = classify(&request(CashCategory::AutreEntree, CategoryLink::Unlinked));
        assert_eq!(plan.recorded_category, CashCategory::AutreEntree);
        assert_eq!(plan.effect, LedgerEffect::CashOnly);
        assert!(plan.is_counted());
        assert_eq!(plan.remission, None);
    }

    #[test]
    fn test_supplier_solde_becomes_trace() {
        let supplier_id = SupplierId::new();
        let plan = classify(&request(
            CashCategory::RemboursementFournisseur,
            CategoryLink::SupplierRefund {
                supplier_id,
                remission: RemissionType::Solde,
            },
        ));

        assert_eq!(
            plan.recorded_category,
            CashCategory::RemboursementFournisseurRemise
        );
        assert_eq!(plan.effect, LedgerEffect::SupplierCredit { supplier_id });
        assert!(!plan.is_counted());
        assert!(!plan.effect.moves_cash());
    }

    #[test]
    fn test_supplier_dette_becomes_trace() {
        let supplier_id = SupplierId::new();
        let plan = classify(&request(
            CashCategory::RemboursementFournisseur,
            CategoryLink::SupplierRefund {
                supplier_id,
                remission: RemissionType::Dette,
            },
        ));

        assert_eq!(plan.effect, LedgerEffect::SupplierDebt { supplier_id });
        assert_eq!(plan.remission, Some(RemissionType::Dette));
        assert!(!plan.is_counted());
    }

    #[test]
    fn test_supplier_exceptionnel_is_cash() {
        let plan = classify(&request(
            CashCategory::RemboursementFournisseur,
            CategoryLink::SupplierRefund {
                supplier_id: SupplierId::new(),
                remission: RemissionType::Exceptionnel,
            },
        ));
        assert_eq!(plan.effect, LedgerEffect::CashOnly);
        assert!(plan.is_counted());
        assert_eq!(plan.recorded_category.operation_type(), OperationType::Entree);
    }

    #[test]
    fn test_advance_is_always_cash() {
        let plan = classify(&request(
            CashCategory::AvanceFournisseur,
            CategoryLink::SupplierAdvance {
                supplier_id: SupplierId::new(),
            },
        ));
        assert_eq!(plan.effect, LedgerEffect::CashOnly);
        assert!(plan.is_counted());
    }

    #[test]
    fn test_client_refund_variants() {
        let client_id = ClientId::new();
        let invoice_id = InvoiceId::new();

        let plan = classify(&request(
            CashCategory::RemboursementClient,
            CategoryLink::ClientRefund {
                client_id,
                invoice_id: None,
                remission: RemissionType::Solde,
            },
        ));
        assert_eq!(plan.recorded_category, CashCategory::RemboursementClientRemise);
        assert_eq!(plan.effect, LedgerEffect::ClientCredit { client_id });

        let plan = classify(&request(
            CashCategory::RemboursementClient,
            CategoryLink::ClientRefund {
                client_id,
                invoice_id: Some(invoice_id),
                remission: RemissionType::Exceptionnel,
            },
        ));
        assert_eq!(plan.recorded_category, CashCategory::RemboursementClient);
        assert_eq!(plan.effect, LedgerEffect::InvoiceRefund { invoice_id });
        assert!(plan.effect.moves_cash());
        assert!(plan.effect.touches_ledger());

        let plan = classify(&request(
            CashCategory::RemboursementClient,
            CategoryLink::ClientRefund {
                client_id,
                invoice_id: None,
                remission: RemissionType::Exceptionnel,
            },
        ));
        assert_eq!(plan.effect, LedgerEffect::CashOnly);
    }

    #[test]
    fn test_ensure_covers() {
        assert!(ensure_covers(dec!(10000), dec!(3000)).is_ok());
        assert!(ensure_covers(dec!(3000), dec!(3000)).is_ok());
        let err = ensure_covers(dec!(2000), dec!(3000)).unwrap_err();
        assert!(matches!(
            err,
            CaisseError::InsufficientBalance { available, requested }
                if available == dec!(2000) && requested == dec!(3000)
        ));
    }

    #[test]
    fn test_ensure_refundable() {
        assert!(ensure_refundable(dec!(500), dec!(500)).is_ok());
        assert!(matches!(
            ensure_refundable(dec!(100), dec!(500)),
            Err(CaisseError::RefundExceedsPaid { .. })
        ));
    }
}
