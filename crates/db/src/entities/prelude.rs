//! `SeaORM` entity prelude.

pub use super::agents::Entity as Agents;
pub use super::cash_operations::Entity as CashOperations;
pub use super::clients::Entity as Clients;
pub use super::invoices::Entity as Invoices;
pub use super::suppliers::Entity as Suppliers;
