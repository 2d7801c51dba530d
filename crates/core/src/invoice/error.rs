//! Invoice error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use agencia_shared::AppError;

use super::types::InvoiceKind;

/// Errors raised by invoice rules.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// A required field is absent or blank.
    #[error("Champ obligatoire manquant: {0}")]
    MissingField(&'static str),

    /// Amounts are inconsistent.
    #[error("Montant invalide: {0}")]
    InvalidAmount(String),

    /// A field value cannot be parsed.
    #[error("Valeur invalide pour {field}: {reason}")]
    InvalidField {
        /// Field name on the wire.
        field: &'static str,
        /// Parser message.
        reason: String,
    },

    /// Invoice kind requires a counterparty that is missing.
    #[error("Une facture {kind} requiert {field}")]
    MissingCounterparty {
        /// Invoice kind.
        kind: InvoiceKind,
        /// Expected link field.
        field: &'static str,
    },

    /// Payment on a cancelled invoice.
    #[error("La facture est annulée")]
    Cancelled,

    /// Payment larger than what remains due.
    #[error("Le paiement dépasse le montant restant ({remaining})")]
    Overpayment {
        /// Amount still due.
        remaining: Decimal,
    },

    /// Invoice already cancelled.
    #[error("Facture déjà annulée")]
    AlreadyCancelled,

    /// Invoice has payments and cannot be cancelled.
    #[error("Une facture avec des paiements ne peut pas être annulée")]
    HasPayments,

    /// Duplicate invoice number for the agency.
    #[error("Le numéro de facture {0} existe déjà")]
    DuplicateNumber(String),

    /// Invoice not found.
    #[error("Facture introuvable: {0}")]
    NotFound(Uuid),

    /// Counterparty not found.
    #[error("Tiers introuvable: {0}")]
    CounterpartyNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl InvoiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_required_field",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvalidField { .. } => "invalid_field",
            Self::MissingCounterparty { .. } => "missing_link",
            Self::Cancelled => "invoice_cancelled",
            Self::Overpayment { .. } => "overpayment",
            Self::AlreadyCancelled => "already_cancelled",
            Self::HasPayments => "invoice_has_payments",
            Self::DuplicateNumber(_) => "duplicate_number",
            Self::NotFound(_) | Self::CounterpartyNotFound(_) => "not_found",
            Self::Database(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::CounterpartyNotFound(_) => 404,
            Self::Database(_) => 500,
            _ => 400,
        }
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err.http_status_code() {
            404 => Self::NotFound(err.to_string()),
            500 => Self::Database(err.to_string()),
            _ => Self::validation(err.error_code(), err.to_string()),
        }
    }
}
