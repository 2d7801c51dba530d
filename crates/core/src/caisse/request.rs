//! Typed cash operation requests.
//!
//! The desk sends a flat bag of optional fields. [`OperationRequest::parse`]
//! turns it into a request whose [`CategoryLink`] carries exactly the linkage
//! its category needs, so later stages never look at a field that does not
//! apply.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agencia_shared::types::{AgentId, ClientId, InvoiceId, SupplierId};

use super::category::{CashCategory, OperationType, PaymentMode};
use super::error::CaisseError;

/// What a supplier or client remboursement settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemissionType {
    /// Reduce the credit balance (`soldeCrediteur`); no cash moves.
    Solde,
    /// Reduce the supplier debt (`detteFournisseur`); no cash moves.
    Dette,
    /// Real cash movement.
    Exceptionnel,
}

impl RemissionType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solde => "solde",
            Self::Dette => "dette",
            Self::Exceptionnel => "exceptionnel",
        }
    }
}

impl fmt::Display for RemissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemissionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solde" => Ok(Self::Solde),
            "dette" => Ok(Self::Dette),
            "exceptionnel" => Ok(Self::Exceptionnel),
            other => Err(format!("Type de remboursement inconnu: {other}")),
        }
    }
}

/// Raw desk input, every field optional.
#[derive(Debug, Clone, Default)]
pub struct OperationDraft {
    /// Amount.
    pub montant: Option<Decimal>,
    /// Free text.
    pub description: Option<String>,
    /// Category wire name.
    pub categorie: Option<String>,
    /// External reference (receipt number, ...).
    pub reference: Option<String>,
    /// Value date; defaults to today.
    pub date: Option<NaiveDate>,
    /// Payment mode wire name; defaults to cash.
    pub mode_paiement: Option<String>,
    /// Direction restated in the body, must agree with the desk.
    pub type_operation: Option<String>,
    /// Agent for `salaire_commission`.
    pub agent_id: Option<AgentId>,
    /// Client for `remboursement_client`.
    pub client_id: Option<ClientId>,
    /// Invoice refunded by a `remboursement_client`.
    pub facture_id: Option<InvoiceId>,
    /// Supplier for supplier categories.
    pub fournisseur_id: Option<SupplierId>,
    /// Remission type wire name.
    pub remboursement_type: Option<String>,
}

/// Linkage carried by a validated request, one variant per linked category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLink {
    /// Category needs no counterparty.
    Unlinked,
    /// `salaire_commission`.
    Agent {
        /// Paid agent.
        agent_id: AgentId,
    },
    /// `remboursement_client`.
    ClientRefund {
        /// Refunded client.
        client_id: ClientId,
        /// Invoice whose payment is refunded, if any.
        invoice_id: Option<InvoiceId>,
        /// `Solde` settles the client credit, `Exceptionnel` pays cash.
        remission: RemissionType,
    },
    /// `remboursement_fournisseur`.
    SupplierRefund {
        /// Refunding supplier.
        supplier_id: SupplierId,
        /// Which balance is settled, or cash.
        remission: RemissionType,
    },
    /// `avance_fournisseur`.
    SupplierAdvance {
        /// Supplier receiving the advance.
        supplier_id: SupplierId,
    },
}

/// A validated desk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Direction.
    pub op_type: OperationType,
    /// Submitted category (before any remission rewrite).
    pub category: CashCategory,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Non-blank description.
    pub description: String,
    /// Payment mode.
    pub payment_mode: PaymentMode,
    /// Value date.
    pub date: NaiveDate,
    /// Optional reference.
    pub reference: Option<String>,
    /// Category-specific linkage.
    pub link: CategoryLink,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_field<T: FromStr<Err = String>>(
    field: &'static str,
    raw: &str,
) -> Result<T, CaisseError> {
    raw.parse()
        .map_err(|reason| CaisseError::InvalidField { field, reason })
}

impl OperationRequest {
    /// Validates a draft submitted on the `desk` side (entry or exit).
    ///
    /// Checks run in a fixed order so the caller always gets the first
    /// problem: required fields, amount sign, category direction, then
    /// category-specific links. Nothing here touches storage.
    pub fn parse(
        draft: OperationDraft,
        desk: OperationType,
        today: NaiveDate,
    ) -> Result<Self, CaisseError> {
        let amount = draft.montant.ok_or(CaisseError::MissingField("montant"))?;
        let description =
            non_blank(draft.description).ok_or(CaisseError::MissingField("description"))?;
        let raw_category =
            non_blank(draft.categorie).ok_or(CaisseError::MissingField("categorie"))?;

        if amount <= Decimal::ZERO {
            return Err(CaisseError::NonPositiveAmount);
        }

        if let Some(raw) = non_blank(draft.type_operation) {
            let stated: OperationType = parse_field("type_operation", &raw)?;
            if stated != desk {
                return Err(CaisseError::InvalidField {
                    field: "type_operation",
                    reason: format!("{stated} soumis sur la caisse {desk}"),
                });
            }
        }

        let category: CashCategory = parse_field("categorie", &raw_category)?;
        if category.operation_type() != desk {
            return Err(CaisseError::CategoryTypeMismatch {
                category,
                op_type: desk,
            });
        }
        if !category.is_manual() {
            return Err(CaisseError::SystemCategory(category));
        }

        let payment_mode = match non_blank(draft.mode_paiement) {
            Some(raw) => parse_field("modePaiement", &raw)?,
            None => PaymentMode::Especes,
        };
        let remission = non_blank(draft.remboursement_type)
            .map(|raw| parse_field::<RemissionType>("remboursementType", &raw))
            .transpose()?;

        let link = match category {
            CashCategory::SalaireCommission => CategoryLink::Agent {
                agent_id: draft.agent_id.ok_or(CaisseError::MissingLink {
                    category,
                    field: "agentId",
                })?,
            },
            CashCategory::RemboursementClient => {
                let client_id = draft.client_id.ok_or(CaisseError::MissingLink {
                    category,
                    field: "clientId",
                })?;
                let remission = remission.unwrap_or(RemissionType::Exceptionnel);
                match remission {
                    RemissionType::Dette => {
                        return Err(CaisseError::RemissionNotAllowed {
                            category,
                            remission: remission.as_str(),
                        });
                    }
                    RemissionType::Solde if draft.facture_id.is_some() => {
                        return Err(CaisseError::InvalidField {
                            field: "factureId",
                            reason: "une remise sur solde ne rembourse pas de facture".into(),
                        });
                    }
                    _ => {}
                }
                CategoryLink::ClientRefund {
                    client_id,
                    invoice_id: draft.facture_id,
                    remission,
                }
            }
            CashCategory::RemboursementFournisseur => CategoryLink::SupplierRefund {
                supplier_id: draft.fournisseur_id.ok_or(CaisseError::MissingLink {
                    category,
                    field: "fournisseurId",
                })?,
                remission: remission.unwrap_or(RemissionType::Exceptionnel),
            },
            CashCategory::AvanceFournisseur => {
                let supplier_id = draft.fournisseur_id.ok_or(CaisseError::MissingLink {
                    category,
                    field: "fournisseurId",
                })?;
                if let Some(r) = remission.filter(|r| *r != RemissionType::Exceptionnel) {
                    return Err(CaisseError::RemissionNotAllowed {
                        category,
                        remission: r.as_str(),
                    });
                }
                CategoryLink::SupplierAdvance { supplier_id }
            }
            _ => CategoryLink::Unlinked,
        };

        Ok(Self {
            op_type: desk,
            category,
            amount,
            description,
            payment_mode,
            date: draft.date.unwrap_or(today),
            reference: non_blank(draft.reference),
            link,
        })
    }
}
