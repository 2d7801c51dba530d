//! Invoices (factures): status derivation, payments and statistics.

pub mod error;
pub mod payment;
pub mod status;
pub mod types;

#[cfg(test)]
mod status_props;

pub use error::InvoiceError;
pub use payment::{
    check_cancel, plan_payment, statistics, InvoiceAmounts, InvoiceStatistics, PaymentPlan,
    StatusCount,
};
pub use status::{derive_status, remaining, InvoiceStatus};
pub use types::{Counterparty, InvoiceDraft, InvoiceKind, NewInvoice};
