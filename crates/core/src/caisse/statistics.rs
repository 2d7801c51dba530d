//! Period statistics for the register.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::balance::{CashLine, CashSummary};
use super::category::{CashCategory, OperationType, PaymentMode};
use super::error::CaisseError;

/// Default window length in days.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;
/// Longest window accepted.
pub const MAX_PERIOD_DAYS: u32 = 366;

/// Inclusive date window ending on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsWindow {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
    /// Number of days, `end - start + 1`.
    pub days: u32,
}

impl StatisticsWindow {
    /// The `days`-long window ending on `today`.
    pub fn ending(today: NaiveDate, days: Option<u32>) -> Result<Self, CaisseError> {
        let days = days.unwrap_or(DEFAULT_PERIOD_DAYS);
        if !(1..=MAX_PERIOD_DAYS).contains(&days) {
            return Err(CaisseError::InvalidField {
                field: "periode",
                reason: format!("doit être entre 1 et {MAX_PERIOD_DAYS} jours"),
            });
        }
        Ok(Self {
            start: today - Duration::days(i64::from(days) - 1),
            end: today,
            days,
        })
    }

    /// True if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Totals for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Category.
    pub categorie: CashCategory,
    /// Its direction.
    #[serde(rename = "type")]
    pub op_type: OperationType,
    /// Sum of amounts.
    pub total: Decimal,
    /// Number of operations.
    pub nombre: u64,
}

/// Totals for one payment mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentModeTotal {
    /// Payment mode.
    pub mode_paiement: PaymentMode,
    /// Counted entries paid this way.
    pub entrees: Decimal,
    /// Counted exits paid this way.
    pub sorties: Decimal,
}

/// One day of the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    /// Day.
    pub date: NaiveDate,
    /// Entries that day.
    pub entrees: Decimal,
    /// Exits that day.
    pub sorties: Decimal,
}

/// Aggregates over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatistics {
    /// Window length in days.
    pub periode: u32,
    /// First day.
    pub date_debut: NaiveDate,
    /// Last day.
    pub date_fin: NaiveDate,
    /// Counted entries.
    pub entrees: Decimal,
    /// Counted exits.
    pub sorties: Decimal,
    /// `entrees - sorties`.
    pub solde: Decimal,
    /// Number of counted operations.
    pub nombre_operations: u64,
    /// Per category, in category order; empty categories omitted.
    pub par_categorie: Vec<CategoryTotal>,
    /// Per payment mode, every mode present.
    pub par_mode_paiement: Vec<PaymentModeTotal>,
    /// One point per day of the window, zero-filled.
    pub par_jour: Vec<DailyTotal>,
}

/// Computes period statistics.
///
/// Lines outside the window, cancelled lines and remission traces are
/// skipped, so the totals agree with [`CashSummary`] over the same rows.
#[must_use]
pub fn compute(window: StatisticsWindow, lines: &[CashLine]) -> PeriodStatistics {
    let counted: Vec<&CashLine> = lines
        .iter()
        .filter(|l| l.is_counted() && window.contains(l.date))
        .collect();

    let summary = CashSummary::from_lines(counted.iter().copied());

    let mut by_category: BTreeMap<usize, (Decimal, u64)> = BTreeMap::new();
    let mut by_mode: BTreeMap<usize, (Decimal, Decimal)> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();

    for line in &counted {
        let cat_idx = CashCategory::ALL
            .iter()
            .position(|c| *c == line.category)
            .unwrap_or(usize::MAX);
        let cat = by_category.entry(cat_idx).or_default();
        cat.0 += line.amount;
        cat.1 += 1;

        let mode_idx = PaymentMode::ALL
            .iter()
            .position(|m| *m == line.payment_mode)
            .unwrap_or(usize::MAX);
        let mode = by_mode.entry(mode_idx).or_default();
        let day = by_day.entry(line.date).or_default();
        match line.op_type {
            OperationType::Entree => {
                mode.0 += line.amount;
                day.0 += line.amount;
            }
            OperationType::Sortie => {
                mode.1 += line.amount;
                day.1 += line.amount;
            }
        }
    }

    let par_categorie = by_category
        .into_iter()
        .filter_map(|(idx, (total, nombre))| {
            CashCategory::ALL.get(idx).map(|c| CategoryTotal {
                categorie: *c,
                op_type: c.operation_type(),
                total,
                nombre,
            })
        })
        .collect();

    let par_mode_paiement = PaymentMode::ALL
        .iter()
        .enumerate()
        .map(|(idx, mode)| {
            let (entrees, sorties) = by_mode.get(&idx).copied().unwrap_or_default();
            PaymentModeTotal {
                mode_paiement: *mode,
                entrees,
                sorties,
            }
        })
        .collect();

    let par_jour = window
        .start
        .iter_days()
        .take_while(|d| *d <= window.end)
        .map(|date| {
            let (entrees, sorties) = by_day.get(&date).copied().unwrap_or_default();
            DailyTotal {
                date,
                entrees,
                sorties,
            }
        })
        .collect();

    PeriodStatistics {
        periode: window.days,
        date_debut: window.start,
        date_fin: window.end,
        entrees: summary.entrees,
        sorties: summary.sorties,
        solde: summary.solde,
        nombre_operations: counted.len() as u64,
        par_categorie,
        par_mode_paiement,
        par_jour,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn line(category: CashCategory, mode: PaymentMode, date: NaiveDate, amount: Decimal) -> CashLine {
        CashLine {
            op_type: category.operation_type(),
            category,
            payment_mode: mode,
            date,
            amount,
            cancelled: false,
        }
    }

    #[rstest]
    #[case(None, 30)]
    #[case(Some(1), 1)]
    #[case(Some(366), 366)]
    fn test_window_lengths(#[case] requested: Option<u32>, #[case] days: u32) {
        let window = StatisticsWindow::ending(day(30), requested).unwrap();
        assert_eq!(window.days, days);
        assert_eq!(window.end, day(30));
        assert_eq!((window.end - window.start).num_days() + 1, i64::from(days));
    }

    #[rstest]
    #[case(0)]
    #[case(367)]
    fn test_window_out_of_range(#[case] days: u32) {
        let err = StatisticsWindow::ending(day(30), Some(days)).unwrap_err();
        assert!(matches!(err, CaisseError::InvalidField { field: "periode", .. }));
    }

    #[test]
    fn test_compute_breakdowns() {
        let window = StatisticsWindow::ending(day(10), Some(7)).unwrap();
        let lines = vec![
            line(CashCategory::AutreEntree, PaymentMode::Especes, day(4), dec!(100)),
            line(CashCategory::AutreEntree, PaymentMode::Virement, day(5), dec!(50)),
            line(CashCategory::AchatDirect, PaymentMode::Especes, day(5), dec!(30)),
            // outside the window
            line(CashCategory::AutreEntree, PaymentMode::Especes, day(3), dec!(1000)),
            // never counted
            line(
                CashCategory::RemboursementFournisseurRemise,
                PaymentMode::Especes,
                day(6),
                dec!(700),
            ),
        ];

        let stats = compute(window, &lines);

        assert_eq!(stats.periode, 7);
        assert_eq!(stats.entrees, dec!(150));
        assert_eq!(stats.sorties, dec!(30));
        assert_eq!(stats.solde, dec!(120));
        assert_eq!(stats.nombre_operations, 3);

        assert_eq!(stats.par_categorie.len(), 2);
        assert_eq!(stats.par_categorie[0].categorie, CashCategory::AutreEntree);
        assert_eq!(stats.par_categorie[0].total, dec!(150));
        assert_eq!(stats.par_categorie[0].nombre, 2);
        assert_eq!(stats.par_categorie[1].categorie, CashCategory::AchatDirect);

        assert_eq!(stats.par_mode_paiement.len(), 3);
        assert_eq!(stats.par_mode_paiement[0].entrees, dec!(100));
        assert_eq!(stats.par_mode_paiement[0].sorties, dec!(30));
        assert_eq!(stats.par_mode_paiement[1].entrees, dec!(50));
        assert_eq!(stats.par_mode_paiement[2].entrees, dec!(0));

        assert_eq!(stats.par_jour.len(), 7);
        assert_eq!(stats.par_jour[0].date, day(4));
        assert_eq!(stats.par_jour[0].entrees, dec!(100));
        assert_eq!(stats.par_jour[1].sorties, dec!(30));
        assert_eq!(stats.par_jour[6].date, day(10));
        assert_eq!(stats.par_jour[6].entrees, dec!(0));
    }

    #[test]
    fn test_serialized_shape() {
        let window = StatisticsWindow::ending(day(2), Some(1)).unwrap();
        let stats = compute(window, &[]);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("nombreOperations").is_some());
        assert!(json.get("parModePaiement").is_some());
        assert_eq!(json["parJour"].as_array().unwrap().len(), 1);
    }
}
