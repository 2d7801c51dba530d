//! Cash operation vocabulary: direction, payment mode and categories.
//!
//! Entry and exit categories are disjoint. Every category knows its own
//! direction, so a request naming `achat_direct` on the entry desk can be
//! rejected before anything touches the database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction of a cash operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Money coming into the register.
    Entree,
    /// Money leaving the register.
    Sortie,
}

impl OperationType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entree => "entree",
            Self::Sortie => "sortie",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entree" | "entrée" => Ok(Self::Entree),
            "sortie" => Ok(Self::Sortie),
            other => Err(format!("Type d'opération inconnu: {other}")),
        }
    }
}

/// How the money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Cash.
    Especes,
    /// Bank transfer.
    Virement,
    /// Cheque.
    Cheque,
}

impl PaymentMode {
    /// All payment modes, in display order.
    pub const ALL: [Self; 3] = [Self::Especes, Self::Virement, Self::Cheque];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Especes => "especes",
            Self::Virement => "virement",
            Self::Cheque => "cheque",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "especes" | "espèces" => Ok(Self::Especes),
            "virement" => Ok(Self::Virement),
            "cheque" | "chèque" => Ok(Self::Cheque),
            other => Err(format!("Mode de paiement inconnu: {other}")),
        }
    }
}

/// Category of a cash operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashCategory {
    // ---- entries a cashier may submit ----
    /// Supplier pays money back (or, with a remission type, settles a balance).
    RemboursementFournisseur,
    /// Direct sale of a service at the desk.
    VenteDirectePrestation,
    /// Initial capital contribution.
    VersementInitialCapital,
    /// Any other entry.
    AutreEntree,
    // ---- entries produced by the system ----
    /// Payment received on a client invoice.
    EncaissementFactureClient,
    /// Money received against a supplier invoice (credit note).
    EncaissementFactureFournisseur,
    /// Client deposit.
    VersementClient,
    /// Supplier deposit.
    VersementFournisseur,
    /// Generic register entry.
    EntreeCaisse,
    // ---- exits a cashier may submit ----
    /// Advance paid to a supplier.
    AvanceFournisseur,
    /// Refund paid to a client.
    RemboursementClient,
    /// Direct purchase.
    AchatDirect,
    /// Salary or commission paid to an agent.
    SalaireCommission,
    /// Owner withdrawal.
    RetraitDeFonds,
    /// Any other exit.
    AutreSortie,
    // ---- exits produced by the system ----
    /// Payment of a supplier invoice.
    ReglementFactureFournisseur,
    /// Payment made against a client invoice (credit note refund).
    ReglementFactureClient,
    /// Automatic invoice settlement.
    ReglementAutomatiqueFacture,
    /// Generic register exit.
    SortieCaisse,
    // ---- ledger-only traces, never counted ----
    /// Supplier balance settled without cash.
    RemboursementFournisseurRemise,
    /// Client credit settled without cash.
    RemboursementClientRemise,
}

impl CashCategory {
    /// Every category.
    pub const ALL: [Self; 21] = [
        Self::RemboursementFournisseur,
        Self::VenteDirectePrestation,
        Self::VersementInitialCapital,
        Self::AutreEntree,
        Self::EncaissementFactureClient,
        Self::EncaissementFactureFournisseur,
        Self::VersementClient,
        Self::VersementFournisseur,
        Self::EntreeCaisse,
        Self::AvanceFournisseur,
        Self::RemboursementClient,
        Self::AchatDirect,
        Self::SalaireCommission,
        Self::RetraitDeFonds,
        Self::AutreSortie,
        Self::ReglementFactureFournisseur,
        Self::ReglementFactureClient,
        Self::ReglementAutomatiqueFacture,
        Self::SortieCaisse,
        Self::RemboursementFournisseurRemise,
        Self::RemboursementClientRemise,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemboursementFournisseur => "remboursement_fournisseur",
            Self::VenteDirectePrestation => "vente_directe_prestation",
            Self::VersementInitialCapital => "versement_initial_capital",
            Self::AutreEntree => "autre_entree",
            Self::EncaissementFactureClient => "encaissement_facture_client",
            Self::EncaissementFactureFournisseur => "encaissement_facture_fournisseur",
            Self::VersementClient => "versement_client",
            Self::VersementFournisseur => "versement_fournisseur",
            Self::EntreeCaisse => "entree_caisse",
            Self::AvanceFournisseur => "avance_fournisseur",
            Self::RemboursementClient => "remboursement_client",
            Self::AchatDirect => "achat_direct",
            Self::SalaireCommission => "salaire_commission",
            Self::RetraitDeFonds => "retrait_de_fonds",
            Self::AutreSortie => "autre_sortie",
            Self::ReglementFactureFournisseur => "reglement_facture_fournisseur",
            Self::ReglementFactureClient => "reglement_facture_client",
            Self::ReglementAutomatiqueFacture => "reglement_automatique_facture",
            Self::SortieCaisse => "sortie_caisse",
            Self::RemboursementFournisseurRemise => "remboursement_fournisseur_remise",
            Self::RemboursementClientRemise => "remboursement_client_remise",
        }
    }

    /// The direction this category belongs to.
    ///
    /// Remission traces keep the direction of the operation they stand in
    /// for, even though they are never counted.
    #[must_use]
    pub const fn operation_type(self) -> OperationType {
        match self {
            Self::RemboursementFournisseur
            | Self::VenteDirectePrestation
            | Self::VersementInitialCapital
            | Self::AutreEntree
            | Self::EncaissementFactureClient
            | Self::EncaissementFactureFournisseur
            | Self::VersementClient
            | Self::VersementFournisseur
            | Self::EntreeCaisse
            | Self::RemboursementFournisseurRemise => OperationType::Entree,
            Self::AvanceFournisseur
            | Self::RemboursementClient
            | Self::AchatDirect
            | Self::SalaireCommission
            | Self::RetraitDeFonds
            | Self::AutreSortie
            | Self::ReglementFactureFournisseur
            | Self::ReglementFactureClient
            | Self::ReglementAutomatiqueFacture
            | Self::SortieCaisse
            | Self::RemboursementClientRemise => OperationType::Sortie,
        }
    }

    /// True for ledger-only remission traces.
    #[must_use]
    pub const fn is_remission(self) -> bool {
        matches!(
            self,
            Self::RemboursementFournisseurRemise | Self::RemboursementClientRemise
        )
    }

    /// True if operations of this category count toward register totals.
    #[must_use]
    pub const fn is_counted(self) -> bool {
        !self.is_remission()
    }

    /// True for categories a cashier can submit through the desk.
    ///
    /// Only these can be cancelled; system categories are produced by
    /// invoice payments and follow the invoice lifecycle instead.
    #[must_use]
    pub const fn is_manual(self) -> bool {
        matches!(
            self,
            Self::RemboursementFournisseur
                | Self::VenteDirectePrestation
                | Self::VersementInitialCapital
                | Self::AutreEntree
                | Self::AvanceFournisseur
                | Self::RemboursementClient
                | Self::AchatDirect
                | Self::SalaireCommission
                | Self::RetraitDeFonds
                | Self::AutreSortie
        )
    }

    /// The trace category recorded when this category settles a ledger
    /// balance instead of moving cash.
    #[must_use]
    pub const fn remission_trace(self) -> Option<Self> {
        match self {
            Self::RemboursementFournisseur => Some(Self::RemboursementFournisseurRemise),
            Self::RemboursementClient => Some(Self::RemboursementClientRemise),
            _ => None,
        }
    }

    /// Categories a cashier can submit for the given direction.
    pub fn manual_for(op_type: OperationType) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |c| c.is_manual() && c.operation_type() == op_type)
    }
}

impl fmt::Display for CashCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CashCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Catégorie inconnue: {s}"))
    }
}
