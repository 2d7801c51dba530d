//! Property-based tests for invoice status derivation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::payment::{plan_payment, InvoiceAmounts};
use super::status::{derive_status, remaining, InvoiceStatus};
use super::types::InvoiceKind;

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn status() -> impl Strategy<Value = InvoiceStatus> {
    prop::sample::select(InvoiceStatus::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Derived status is `payee` iff paid covers TTC, unless cancelled.
    #[test]
    fn prop_payee_iff_fully_paid(ttc in positive_amount(), paid in amount(), persisted in status()) {
        let derived = derive_status(ttc, paid, persisted);
        if persisted == InvoiceStatus::Annulee {
            prop_assert_eq!(derived, InvoiceStatus::Annulee);
        } else {
            // a stored `payee` with nothing paid is kept as is
            let stored_payee = persisted == InvoiceStatus::Payee && paid == Decimal::ZERO;
            prop_assert_eq!(derived == InvoiceStatus::Payee, paid >= ttc || stored_payee);
        }
    }

    /// Cancelled always wins.
    #[test]
    fn prop_annulee_wins(ttc in positive_amount(), paid in amount()) {
        prop_assert_eq!(derive_status(ttc, paid, InvoiceStatus::Annulee), InvoiceStatus::Annulee);
    }

    /// Remaining is never negative and adds back up to TTC while unpaid.
    #[test]
    fn prop_remaining_bounds(ttc in positive_amount(), paid in amount()) {
        let rest = remaining(ttc, paid);
        prop_assert!(rest >= Decimal::ZERO);
        if paid <= ttc {
            prop_assert_eq!(rest + paid, ttc);
        }
    }

    /// An accepted payment never takes the invoice past TTC.
    #[test]
    fn prop_payment_never_overpays(
        ttc in positive_amount(),
        paid in amount(),
        pay in positive_amount(),
        client in any::<bool>(),
    ) {
        let paid = paid.min(ttc);
        let invoice = InvoiceAmounts {
            kind: if client { InvoiceKind::Client } else { InvoiceKind::Fournisseur },
            montant_ttc: ttc,
            montant_paye: paid,
            statut: InvoiceStatus::Envoyee,
        };
        if let Ok(plan) = plan_payment(&invoice, pay) {
            prop_assert!(paid + plan.amount <= ttc);
        } else {
            prop_assert!(pay > ttc - paid);
        }
    }
}
