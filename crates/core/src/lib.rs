//! Core business logic for Agencia.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `caisse` - Cash register validation, classification and totals
//! - `invoice` - Invoice status derivation and payments
//! - `counterparty` - Supplier, client and agent creation rules
//! - `airline` - Read-only airline directory

pub mod airline;
pub mod caisse;
pub mod counterparty;
pub mod invoice;
