//! Invoice status derivation.
//!
//! The persisted `statut` is only a hint: paid amounts decide whether an
//! invoice shows as paid or partially paid. Every view (list filter, detail,
//! statistics) goes through [`derive_status`].

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Draft.
    Brouillon,
    /// Sent to the counterparty.
    Envoyee,
    /// Some but not all of it is paid.
    PartiellementPayee,
    /// Fully paid.
    Payee,
    /// Past due.
    EnRetard,
    /// Cancelled.
    Annulee,
}

impl InvoiceStatus {
    /// Every status.
    pub const ALL: [Self; 6] = [
        Self::Brouillon,
        Self::Envoyee,
        Self::PartiellementPayee,
        Self::Payee,
        Self::EnRetard,
        Self::Annulee,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brouillon => "brouillon",
            Self::Envoyee => "envoyee",
            Self::PartiellementPayee => "partiellement_payee",
            Self::Payee => "payee",
            Self::EnRetard => "en_retard",
            Self::Annulee => "annulee",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| format!("Statut de facture inconnu: {s}"))
    }
}

/// Effective status shown everywhere.
///
/// `annulee` always wins; otherwise `payee` once paid reaches TTC,
/// `partiellement_payee` while strictly between zero and TTC, else the
/// persisted status.
#[must_use]
pub fn derive_status(
    montant_ttc: Decimal,
    montant_paye: Decimal,
    persisted: InvoiceStatus,
) -> InvoiceStatus {
    if persisted == InvoiceStatus::Annulee {
        return InvoiceStatus::Annulee;
    }
    if montant_paye >= montant_ttc {
        return InvoiceStatus::Payee;
    }
    if montant_paye > Decimal::ZERO {
        return InvoiceStatus::PartiellementPayee;
    }
    persisted
}

/// Amount still due, never negative.
#[must_use]
pub fn remaining(montant_ttc: Decimal, montant_paye: Decimal) -> Decimal {
    (montant_ttc - montant_paye).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(12000), dec!(12000), InvoiceStatus::Envoyee, InvoiceStatus::Payee)]
    #[case(dec!(12000), dec!(15000), InvoiceStatus::Brouillon, InvoiceStatus::Payee)]
    #[case(dec!(12000), dec!(1), InvoiceStatus::Envoyee, InvoiceStatus::PartiellementPayee)]
    #[case(dec!(12000), dec!(0), InvoiceStatus::Envoyee, InvoiceStatus::Envoyee)]
    #[case(dec!(12000), dec!(0), InvoiceStatus::EnRetard, InvoiceStatus::EnRetard)]
    #[case(dec!(12000), dec!(0), InvoiceStatus::Annulee, InvoiceStatus::Annulee)]
    #[case(dec!(12000), dec!(12000), InvoiceStatus::Annulee, InvoiceStatus::Annulee)]
    #[case(dec!(12000), dec!(0), InvoiceStatus::Payee, InvoiceStatus::Payee)]
    fn test_derive_status(
        #[case] ttc: Decimal,
        #[case] paid: Decimal,
        #[case] persisted: InvoiceStatus,
        #[case] expected: InvoiceStatus,
    ) {
        assert_eq!(derive_status(ttc, paid, persisted), expected);
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        assert_eq!(remaining(dec!(12000), dec!(2000)), dec!(10000));
        assert_eq!(remaining(dec!(12000), dec!(13000)), dec!(0));
    }

    #[test]
    fn test_status_wire_names() {
        for status in InvoiceStatus::ALL {
            assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), status);
        }
        assert!("remboursee".parse::<InvoiceStatus>().is_err());
    }
}
