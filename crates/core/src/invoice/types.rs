//! Invoice domain types and creation rules.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agencia_shared::types::{ClientId, SupplierId};

use super::error::InvoiceError;
use super::status::InvoiceStatus;
use crate::caisse::{CashCategory, OperationType};

/// Who the invoice is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// The agency bills a client.
    Client,
    /// A supplier bills the agency.
    Fournisseur,
}

impl InvoiceKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Fournisseur => "fournisseur",
        }
    }

    /// Register category recorded for a payment on this kind of invoice.
    #[must_use]
    pub const fn payment_category(self) -> CashCategory {
        match self {
            Self::Client => CashCategory::EncaissementFactureClient,
            Self::Fournisseur => CashCategory::ReglementFactureFournisseur,
        }
    }

    /// Register direction of a payment on this kind of invoice.
    #[must_use]
    pub const fn payment_direction(self) -> OperationType {
        self.payment_category().operation_type()
    }
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "fournisseur" => Ok(Self::Fournisseur),
            other => Err(format!("Type de facture inconnu: {other}")),
        }
    }
}

/// Counterparty of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterparty {
    /// Client invoice.
    Client(ClientId),
    /// Supplier invoice.
    Supplier(SupplierId),
}

impl Counterparty {
    /// The invoice kind implied by the counterparty.
    #[must_use]
    pub const fn kind(self) -> InvoiceKind {
        match self {
            Self::Client(_) => InvoiceKind::Client,
            Self::Supplier(_) => InvoiceKind::Fournisseur,
        }
    }
}

/// Raw creation input.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDraft {
    /// Invoice number.
    pub numero: Option<String>,
    /// `client` or `fournisseur`.
    pub kind: Option<String>,
    /// Client for a client invoice.
    pub client_id: Option<ClientId>,
    /// Supplier for a supplier invoice.
    pub fournisseur_id: Option<SupplierId>,
    /// Amount before tax.
    pub montant_ht: Option<Decimal>,
    /// Amount including tax.
    pub montant_ttc: Option<Decimal>,
    /// Initial status, `brouillon` or `envoyee`.
    pub statut: Option<String>,
    /// Issue date; defaults to today.
    pub date_emission: Option<NaiveDate>,
    /// Due date.
    pub date_echeance: Option<NaiveDate>,
}

/// A validated invoice ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    /// Invoice number.
    pub numero: String,
    /// Client or supplier.
    pub counterparty: Counterparty,
    /// Amount before tax.
    pub montant_ht: Decimal,
    /// Amount including tax.
    pub montant_ttc: Decimal,
    /// Initial persisted status.
    pub statut: InvoiceStatus,
    /// Issue date.
    pub date_emission: NaiveDate,
    /// Due date.
    pub date_echeance: Option<NaiveDate>,
}

impl NewInvoice {
    /// Validates a creation draft.
    pub fn parse(draft: InvoiceDraft, today: NaiveDate) -> Result<Self, InvoiceError> {
        let numero = draft
            .numero
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(InvoiceError::MissingField("numero"))?;
        let kind: InvoiceKind = draft
            .kind
            .ok_or(InvoiceError::MissingField("kind"))?
            .parse()
            .map_err(|reason| InvoiceError::InvalidField {
                field: "kind",
                reason,
            })?;
        let montant_ttc = draft
            .montant_ttc
            .ok_or(InvoiceError::MissingField("montantTtc"))?;
        let montant_ht = draft.montant_ht.unwrap_or(montant_ttc);

        if montant_ttc <= Decimal::ZERO {
            return Err(InvoiceError::InvalidAmount(
                "le montant TTC doit être strictement positif".into(),
            ));
        }
        if montant_ht < Decimal::ZERO || montant_ht > montant_ttc {
            return Err(InvoiceError::InvalidAmount(
                "le montant HT doit être entre 0 et le montant TTC".into(),
            ));
        }

        let counterparty = match kind {
            InvoiceKind::Client => Counterparty::Client(draft.client_id.ok_or(
                InvoiceError::MissingCounterparty {
                    kind,
                    field: "clientId",
                },
            )?),
            InvoiceKind::Fournisseur => Counterparty::Supplier(draft.fournisseur_id.ok_or(
                InvoiceError::MissingCounterparty {
                    kind,
                    field: "fournisseurId",
                },
            )?),
        };

        let statut = match draft.statut {
            None => InvoiceStatus::Brouillon,
            Some(raw) => {
                let status: InvoiceStatus =
                    raw.parse().map_err(|reason| InvoiceError::InvalidField {
                        field: "statut",
                        reason,
                    })?;
                if !matches!(status, InvoiceStatus::Brouillon | InvoiceStatus::Envoyee) {
                    return Err(InvoiceError::InvalidField {
                        field: "statut",
                        reason: format!("{status} ne peut pas être choisi à la création"),
                    });
                }
                status
            }
        };

        let date_emission = draft.date_emission.unwrap_or(today);
        if let Some(echeance) = draft.date_echeance {
            if echeance < date_emission {
                return Err(InvoiceError::InvalidField {
                    field: "dateEcheance",
                    reason: "antérieure à la date d'émission".into(),
                });
            }
        }

        Ok(Self {
            numero,
            counterparty,
            montant_ht,
            montant_ttc,
            statut,
            date_emission,
            date_echeance: draft.date_echeance,
        })
    }
}
