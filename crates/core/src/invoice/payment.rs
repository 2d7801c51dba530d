//! Payments, cancellation and statistics over invoices.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::InvoiceError;
use super::status::{derive_status, remaining, InvoiceStatus};
use super::types::InvoiceKind;
use crate::caisse::{CashCategory, OperationType};

/// Stored amounts and status of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceAmounts {
    /// Client or supplier.
    pub kind: InvoiceKind,
    /// Amount including tax.
    pub montant_ttc: Decimal,
    /// Amount paid so far.
    pub montant_paye: Decimal,
    /// Persisted status.
    pub statut: InvoiceStatus,
}

impl InvoiceAmounts {
    /// Effective status.
    #[must_use]
    pub fn status(&self) -> InvoiceStatus {
        derive_status(self.montant_ttc, self.montant_paye, self.statut)
    }

    /// Amount still due.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        remaining(self.montant_ttc, self.montant_paye)
    }
}

/// Register row to record for an accepted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentPlan {
    /// System category of the register row.
    pub category: CashCategory,
    /// Register direction.
    pub op_type: OperationType,
    /// Amount added to `montantPaye`.
    pub amount: Decimal,
}

/// Accepts or rejects a payment against an invoice.
pub fn plan_payment(invoice: &InvoiceAmounts, amount: Decimal) -> Result<PaymentPlan, InvoiceError> {
    if amount <= Decimal::ZERO {
        return Err(InvoiceError::InvalidAmount(
            "le paiement doit être strictement positif".into(),
        ));
    }
    if invoice.statut == InvoiceStatus::Annulee {
        return Err(InvoiceError::Cancelled);
    }
    let due = invoice.remaining();
    if amount > due {
        return Err(InvoiceError::Overpayment { remaining: due });
    }
    Ok(PaymentPlan {
        category: invoice.kind.payment_category(),
        op_type: invoice.kind.payment_direction(),
        amount,
    })
}

/// Checks that an invoice can be cancelled.
pub fn check_cancel(invoice: &InvoiceAmounts) -> Result<(), InvoiceError> {
    if invoice.statut == InvoiceStatus::Annulee {
        return Err(InvoiceError::AlreadyCancelled);
    }
    if invoice.montant_paye > Decimal::ZERO {
        return Err(InvoiceError::HasPayments);
    }
    Ok(())
}

/// Count and amount for one effective status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    /// Effective status.
    pub statut: InvoiceStatus,
    /// Number of invoices.
    pub nombre: u64,
    /// Sum of TTC amounts.
    pub montant_ttc: Decimal,
}

/// Invoice statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStatistics {
    /// Number of invoices.
    pub nombre: u64,
    /// TTC total over non-cancelled invoices.
    pub montant_total: Decimal,
    /// Paid total over non-cancelled invoices.
    pub montant_paye: Decimal,
    /// Still due over non-cancelled invoices.
    pub montant_restant: Decimal,
    /// One entry per status, in status order.
    pub par_statut: Vec<StatusCount>,
}

/// Aggregates invoices by effective status.
#[must_use]
pub fn statistics(invoices: &[InvoiceAmounts]) -> InvoiceStatistics {
    let mut par_statut: Vec<StatusCount> = InvoiceStatus::ALL
        .into_iter()
        .map(|statut| StatusCount {
            statut,
            nombre: 0,
            montant_ttc: Decimal::ZERO,
        })
        .collect();

    let mut montant_total = Decimal::ZERO;
    let mut montant_paye = Decimal::ZERO;
    let mut montant_restant = Decimal::ZERO;

    for invoice in invoices {
        let status = invoice.status();
        if let Some(bucket) = par_statut.iter_mut().find(|b| b.statut == status) {
            bucket.nombre += 1;
            bucket.montant_ttc += invoice.montant_ttc;
        }
        if status != InvoiceStatus::Annulee {
            montant_total += invoice.montant_ttc;
            montant_paye += invoice.montant_paye;
            montant_restant += invoice.remaining();
        }
    }

    InvoiceStatistics {
        nombre: invoices.len() as u64,
        montant_total,
        montant_paye,
        montant_restant,
        par_statut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(kind: InvoiceKind, ttc: Decimal, paid: Decimal, statut: InvoiceStatus) -> InvoiceAmounts {
        InvoiceAmounts {
            kind,
            montant_ttc: ttc,
            montant_paye: paid,
            statut,
        }
    }

    #[test]
    fn test_client_payment_is_entry() {
        let inv = invoice(InvoiceKind::Client, dec!(12000), dec!(0), InvoiceStatus::Envoyee);
        let plan = plan_payment(&inv, dec!(5000)).unwrap();
        assert_eq!(plan.category, CashCategory::EncaissementFactureClient);
        assert_eq!(plan.op_type, OperationType::Entree);
        assert_eq!(plan.amount, dec!(5000));
    }

    #[test]
    fn test_supplier_payment_is_exit() {
        let inv = invoice(
            InvoiceKind::Fournisseur,
            dec!(800),
            dec!(300),
            InvoiceStatus::Envoyee,
        );
        let plan = plan_payment(&inv, dec!(500)).unwrap();
        assert_eq!(plan.category, CashCategory::ReglementFactureFournisseur);
        assert_eq!(plan.op_type, OperationType::Sortie);
    }

    #[test]
    fn test_payment_rejections() {
        let inv = invoice(InvoiceKind::Client, dec!(1000), dec!(800), InvoiceStatus::Envoyee);
        assert!(matches!(
            plan_payment(&inv, dec!(201)),
            Err(InvoiceError::Overpayment { remaining }) if remaining == dec!(200)
        ));
        assert!(matches!(
            plan_payment(&inv, dec!(0)),
            Err(InvoiceError::InvalidAmount(_))
        ));

        let cancelled = invoice(InvoiceKind::Client, dec!(1000), dec!(0), InvoiceStatus::Annulee);
        assert!(matches!(
            plan_payment(&cancelled, dec!(10)),
            Err(InvoiceError::Cancelled)
        ));
    }

    #[test]
    fn test_check_cancel() {
        let fresh = invoice(InvoiceKind::Client, dec!(1000), dec!(0), InvoiceStatus::Brouillon);
        assert!(check_cancel(&fresh).is_ok());

        let paid = invoice(InvoiceKind::Client, dec!(1000), dec!(10), InvoiceStatus::Envoyee);
        assert!(matches!(check_cancel(&paid), Err(InvoiceError::HasPayments)));

        let cancelled = invoice(InvoiceKind::Client, dec!(1000), dec!(0), InvoiceStatus::Annulee);
        assert!(matches!(
            check_cancel(&cancelled),
            Err(InvoiceError::AlreadyCancelled)
        ));
    }

    #[test]
    fn test_statistics_use_derived_status() {
        let invoices = vec![
            invoice(InvoiceKind::Client, dec!(12000), dec!(12000), InvoiceStatus::Envoyee),
            invoice(InvoiceKind::Client, dec!(1000), dec!(400), InvoiceStatus::Envoyee),
            invoice(InvoiceKind::Client, dec!(500), dec!(0), InvoiceStatus::Brouillon),
            invoice(InvoiceKind::Client, dec!(900), dec!(0), InvoiceStatus::Annulee),
        ];

        let stats = statistics(&invoices);

        assert_eq!(stats.nombre, 4);
        assert_eq!(stats.montant_total, dec!(13500));
        assert_eq!(stats.montant_paye, dec!(12400));
        assert_eq!(stats.montant_restant, dec!(1100));

        let count = |s: InvoiceStatus| {
            stats
                .par_statut
                .iter()
                .find(|b| b.statut == s)
                .map(|b| b.nombre)
                .unwrap()
        };
        assert_eq!(count(InvoiceStatus::Payee), 1);
        assert_eq!(count(InvoiceStatus::PartiellementPayee), 1);
        assert_eq!(count(InvoiceStatus::Brouillon), 1);
        assert_eq!(count(InvoiceStatus::Annulee), 1);
        assert_eq!(count(InvoiceStatus::Envoyee), 0);
    }
}
