//! Cash register (caisse) reconciliation.
//!
//! - Category vocabulary and directions
//! - Typed desk requests, one link variant per category
//! - Classification into a single balance effect
//! - Totals and period statistics
//! - Cancel / edit / delete rules

pub mod balance;
pub mod category;
pub mod classify;
pub mod error;
pub mod lifecycle;
pub mod request;
pub mod statistics;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod validation_props;

pub use balance::{CashLine, CashSummary};
pub use category::{CashCategory, OperationType, PaymentMode};
pub use classify::{classify, ensure_covers, ensure_refundable, LedgerEffect, OperationPlan};
pub use error::CaisseError;
pub use lifecycle::{check_delete, check_edit, plan_cancellation, OperationSnapshot, Reversal};
pub use request::{CategoryLink, OperationDraft, OperationRequest, RemissionType};
pub use statistics::{PeriodStatistics, StatisticsWindow};
