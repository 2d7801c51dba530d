//! Cash register error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use agencia_shared::AppError;

use super::category::{CashCategory, OperationType};

/// Errors raised while validating or applying cash operations.
#[derive(Debug, Error)]
pub enum CaisseError {
    // ========== Validation Errors ==========
    /// A required field is absent or blank.
    #[error("Champ obligatoire manquant: {0}")]
    MissingField(&'static str),

    /// Amount is zero or negative.
    #[error("Le montant doit être strictement positif")]
    NonPositiveAmount,

    /// A field value cannot be parsed.
    #[error("Valeur invalide pour {field}: {reason}")]
    InvalidField {
        /// Field name on the wire.
        field: &'static str,
        /// Parser message.
        reason: String,
    },

    /// Category does not belong to the requested direction.
    #[error("La catégorie {category} n'est pas valide pour une opération de type {op_type}")]
    CategoryTypeMismatch {
        /// Submitted category.
        category: CashCategory,
        /// Requested direction.
        op_type: OperationType,
    },

    /// Category exists but cannot be submitted from the desk.
    #[error("La catégorie {0} est réservée au système")]
    SystemCategory(CashCategory),

    /// Category needs a linked entity that was not provided.
    #[error("La catégorie {category} requiert {field}")]
    MissingLink {
        /// Submitted category.
        category: CashCategory,
        /// The missing link field.
        field: &'static str,
    },

    /// Remission type not allowed for this category.
    #[error("Type de remboursement {remission} non autorisé pour {category}")]
    RemissionNotAllowed {
        /// Submitted category.
        category: CashCategory,
        /// Submitted remission type.
        remission: &'static str,
    },

    /// Ledger balance too small for the requested remission.
    #[error("Solde insuffisant: disponible {available}, demandé {requested}")]
    InsufficientBalance {
        /// Balance available on the counterparty.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// Linked invoice belongs to another counterparty.
    #[error("La facture {0} n'appartient pas à ce client")]
    InvoiceCounterpartyMismatch(Uuid),

    /// Refund exceeds what was paid on the linked invoice.
    #[error("Le remboursement dépasse le montant payé de la facture ({paid})")]
    RefundExceedsPaid {
        /// Amount paid on the invoice.
        paid: Decimal,
    },

    // ========== Lifecycle Errors ==========
    /// Restoring a refunded amount would push the invoice past its total.
    #[error("L'annulation du remboursement dépasserait le montant de la facture (reste {remaining})")]
    RefundCancelWouldOverpay {
        /// Amount still due on the invoice.
        remaining: Decimal,
    },

    /// Operation was already cancelled.
    #[error("Opération déjà annulée")]
    AlreadyCancelled,

    /// Only desk operations can be cancelled.
    #[error("Seules les opérations manuelles peuvent être annulées")]
    NotManual,

    /// Amount of a linked operation cannot be edited.
    #[error("Le montant d'une opération liée ne peut pas être modifié")]
    LinkedAmountEdit,

    /// Deletion would leave a ledger balance without its trace.
    #[error("Annulez l'opération avant de la supprimer")]
    DeleteRequiresCancel,

    // ========== Lookup Errors ==========
    /// Cash operation not found.
    #[error("Opération introuvable: {0}")]
    OperationNotFound(Uuid),

    /// Supplier not found.
    #[error("Fournisseur introuvable: {0}")]
    SupplierNotFound(Uuid),

    /// Client not found.
    #[error("Client introuvable: {0}")]
    ClientNotFound(Uuid),

    /// Agent not found.
    #[error("Agent introuvable: {0}")]
    AgentNotFound(Uuid),

    /// Invoice not found.
    #[error("Facture introuvable: {0}")]
    InvoiceNotFound(Uuid),

    // ========== Infrastructure ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CaisseError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_required_field",
            Self::NonPositiveAmount => "invalid_amount",
            Self::InvalidField { .. } => "invalid_field",
            Self::CategoryTypeMismatch { .. } => "invalid_category",
            Self::SystemCategory(_) => "system_category",
            Self::MissingLink { .. } => "missing_link",
            Self::RemissionNotAllowed { .. } => "invalid_remission_type",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InvoiceCounterpartyMismatch(_) => "invoice_mismatch",
            Self::RefundExceedsPaid { .. } => "refund_exceeds_paid",
            Self::RefundCancelWouldOverpay { .. } => "refund_cancel_overpays",
            Self::AlreadyCancelled => "already_cancelled",
            Self::NotManual => "not_manual",
            Self::LinkedAmountEdit => "linked_amount_edit",
            Self::DeleteRequiresCancel => "delete_requires_cancel",
            Self::OperationNotFound(_)
            | Self::SupplierNotFound(_)
            | Self::ClientNotFound(_)
            | Self::AgentNotFound(_)
            | Self::InvoiceNotFound(_) => "not_found",
            Self::Database(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::OperationNotFound(_)
            | Self::SupplierNotFound(_)
            | Self::ClientNotFound(_)
            | Self::AgentNotFound(_)
            | Self::InvoiceNotFound(_) => 404,
            Self::Database(_) => 500,
            _ => 400,
        }
    }
}

impl From<CaisseError> for AppError {
    fn from(err: CaisseError) -> Self {
        match err.http_status_code() {
            404 => Self::NotFound(err.to_string()),
            500 => Self::Database(err.to_string()),
            _ => Self::validation(err.error_code(), err.to_string()),
        }
    }
}
