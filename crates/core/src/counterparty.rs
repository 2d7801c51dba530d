//! Suppliers, clients and agents as seen by the register.
//!
//! Only the fields that carry rules live here: names must be present and
//! ledger balances start non-negative.

use rust_decimal::Decimal;

use crate::caisse::CaisseError;

fn required_name(nom: Option<String>) -> Result<String, CaisseError> {
    nom.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(CaisseError::MissingField("nom"))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn opening_balance(field: &'static str, value: Option<Decimal>) -> Result<Decimal, CaisseError> {
    let value = value.unwrap_or(Decimal::ZERO);
    if value < Decimal::ZERO {
        return Err(CaisseError::InvalidField {
            field,
            reason: "doit être positif ou nul".into(),
        });
    }
    Ok(value)
}

/// A supplier ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSupplier {
    /// Name.
    pub nom: String,
    /// Contact line.
    pub contact: Option<String>,
    /// Opening credit owed to the supplier.
    pub solde_crediteur: Decimal,
    /// Opening debt owed by the supplier.
    pub dette_fournisseur: Decimal,
}

impl NewSupplier {
    /// Validates raw input.
    pub fn parse(
        nom: Option<String>,
        contact: Option<String>,
        solde_crediteur: Option<Decimal>,
        dette_fournisseur: Option<Decimal>,
    ) -> Result<Self, CaisseError> {
        Ok(Self {
            nom: required_name(nom)?,
            contact: optional_text(contact),
            solde_crediteur: opening_balance("soldeCrediteur", solde_crediteur)?,
            dette_fournisseur: opening_balance("detteFournisseur", dette_fournisseur)?,
        })
    }
}

/// A client ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    /// Name.
    pub nom: String,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub telephone: Option<String>,
    /// Opening credit owed to the client.
    pub solde_crediteur: Decimal,
}

impl NewClient {
    /// Validates raw input.
    pub fn parse(
        nom: Option<String>,
        email: Option<String>,
        telephone: Option<String>,
        solde_crediteur: Option<Decimal>,
    ) -> Result<Self, CaisseError> {
        Ok(Self {
            nom: required_name(nom)?,
            email: optional_text(email),
            telephone: optional_text(telephone),
            solde_crediteur: opening_balance("soldeCrediteur", solde_crediteur)?,
        })
    }
}

/// An agent ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgent {
    /// Name.
    pub nom: String,
    /// Email.
    pub email: Option<String>,
}

impl NewAgent {
    /// Validates raw input.
    pub fn parse(nom: Option<String>, email: Option<String>) -> Result<Self, CaisseError> {
        Ok(Self {
            nom: required_name(nom)?,
            email: optional_text(email),
        })
    }
}
