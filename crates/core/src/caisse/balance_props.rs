//! Property-based tests for register totals and statistics.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{CashLine, CashSummary};
use super::category::{CashCategory, PaymentMode};
use super::statistics::{compute, StatisticsWindow};

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn category() -> impl Strategy<Value = CashCategory> {
    prop::sample::select(CashCategory::ALL.to_vec())
}

fn payment_mode() -> impl Strategy<Value = PaymentMode> {
    prop::sample::select(PaymentMode::ALL.to_vec())
}

fn cash_line() -> impl Strategy<Value = CashLine> {
    (category(), payment_mode(), 0u32..60, amount(), any::<bool>()).prop_map(
        |(category, payment_mode, offset, amount, cancelled)| CashLine {
            op_type: category.operation_type(),
            category,
            payment_mode,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
                + chrono::Duration::days(i64::from(offset)),
            amount,
            cancelled,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `solde` is counted entries minus counted exits, with remission
    /// traces and cancelled rows left out.
    #[test]
    fn prop_solde_is_counted_entries_minus_exits(lines in prop::collection::vec(cash_line(), 0..40)) {
        let summary = CashSummary::from_lines(&lines);

        let expected_in: Decimal = lines
            .iter()
            .filter(|l| !l.cancelled && !l.category.is_remission())
            .filter(|l| l.op_type == super::category::OperationType::Entree)
            .map(|l| l.amount)
            .sum();
        let expected_out: Decimal = lines
            .iter()
            .filter(|l| !l.cancelled && !l.category.is_remission())
            .filter(|l| l.op_type == super::category::OperationType::Sortie)
            .map(|l| l.amount)
            .sum();

        prop_assert_eq!(summary.entrees, expected_in);
        prop_assert_eq!(summary.sorties, expected_out);
        prop_assert_eq!(summary.solde, expected_in - expected_out);
    }

    /// Adding a remission trace never changes the totals.
    #[test]
    fn prop_remission_never_counted(
        lines in prop::collection::vec(cash_line(), 0..20),
        trace_amount in amount(),
        supplier_side in any::<bool>(),
    ) {
        let before = CashSummary::from_lines(&lines);
        let category = if supplier_side {
            CashCategory::RemboursementFournisseurRemise
        } else {
            CashCategory::RemboursementClientRemise
        };
        let mut with_trace = lines.clone();
        with_trace.push(CashLine {
            op_type: category.operation_type(),
            category,
            payment_mode: PaymentMode::Especes,
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or_default(),
            amount: trace_amount,
            cancelled: false,
        });

        prop_assert_eq!(CashSummary::from_lines(&with_trace), before);
    }

    /// Over a window covering every line, statistics agree with the summary
    /// and the breakdowns add up to the totals.
    #[test]
    fn prop_statistics_agree_with_summary(lines in prop::collection::vec(cash_line(), 0..40)) {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default();
        let window = StatisticsWindow::ending(today, Some(90)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let stats = compute(window, &lines);
        let summary = CashSummary::from_lines(&lines);

        prop_assert_eq!(stats.entrees, summary.entrees);
        prop_assert_eq!(stats.sorties, summary.sorties);
        prop_assert_eq!(stats.solde, summary.solde);

        let by_cat: Decimal = stats.par_categorie.iter().map(|c| c.total).sum();
        prop_assert_eq!(by_cat, summary.entrees + summary.sorties);

        let mode_in: Decimal = stats.par_mode_paiement.iter().map(|m| m.entrees).sum();
        let day_out: Decimal = stats.par_jour.iter().map(|d| d.sorties).sum();
        prop_assert_eq!(mode_in, summary.entrees);
        prop_assert_eq!(day_out, summary.sorties);
        prop_assert_eq!(stats.par_jour.len(), 90);
    }
}
