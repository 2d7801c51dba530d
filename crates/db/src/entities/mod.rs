//! `SeaORM` entity definitions.
//!
//! Enumerations are stored as their wire strings and parsed back into the
//! core types by the repositories.

pub mod prelude;

pub mod agents;
pub mod cash_operations;
pub mod clients;
pub mod invoices;
pub mod suppliers;
