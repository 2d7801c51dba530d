//! Register totals.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::category::{CashCategory, OperationType, PaymentMode};

/// The fields of a persisted operation that matter for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashLine {
    /// Direction.
    pub op_type: OperationType,
    /// Recorded category.
    pub category: CashCategory,
    /// Payment mode.
    pub payment_mode: PaymentMode,
    /// Value date.
    pub date: NaiveDate,
    /// Amount, always positive.
    pub amount: Decimal,
    /// Cancelled operations stay in the journal but are never counted.
    pub cancelled: bool,
}

impl CashLine {
    /// True if this line moves register totals.
    #[must_use]
    pub const fn is_counted(&self) -> bool {
        !self.cancelled && self.category.is_counted()
    }
}

/// Entries, exits and the resulting balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CashSummary {
    /// Sum of counted entries.
    pub entrees: Decimal,
    /// Sum of counted exits.
    pub sorties: Decimal,
    /// `entrees - sorties`.
    pub solde: Decimal,
}

impl CashSummary {
    /// Folds one line into the totals. Non-counted lines are ignored.
    pub fn add(&mut self, line: &CashLine) {
        if !line.is_counted() {
            return;
        }
        match line.op_type {
            OperationType::Entree => self.entrees += line.amount,
            OperationType::Sortie => self.sorties += line.amount,
        }
        self.solde = self.entrees - self.sorties;
    }

    /// Totals over a set of lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a CashLine>) -> Self {
        let mut summary = Self::default();
        for line in lines {
            summary.add(line);
        }
        summary
    }
}
