//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every query is scoped by agency.

pub mod agent;
pub mod caisse;
pub mod client;
pub mod error;
pub mod invoice;
pub mod supplier;

pub use agent::AgentRepository;
pub use caisse::{cash_line, snapshot, CaisseRepository, CashOperationFilter, OperationUpdate};
pub use client::ClientRepository;
pub use error::RepositoryError;
pub use invoice::{
    invoice_amounts, InvoiceFilter, InvoiceRepository, InvoicePaymentInput, RecordedPayment,
};
pub use supplier::{SupplierBalance, SupplierRepository};
