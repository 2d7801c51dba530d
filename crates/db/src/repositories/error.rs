//! Repository error type.

use std::str::FromStr;

use sea_orm::DbErr;
use uuid::Uuid;

use agencia_core::caisse::CaisseError;
use agencia_core::invoice::InvoiceError;
use agencia_shared::AppError;

/// Errors returned by repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Cash register rule violated.
    #[error(transparent)]
    Caisse(#[from] CaisseError),

    /// Invoice rule violated.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// A stored enumeration value no longer parses.
    #[error("Corrupt row {id}: {reason}")]
    CorruptRow {
        /// Row ID.
        id: Uuid,
        /// Parser message.
        reason: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Caisse(e) => e.into(),
            RepositoryError::Invoice(e) => e.into(),
            RepositoryError::CorruptRow { .. } => Self::Internal(err.to_string()),
            RepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Parses a string column into its core type.
pub(crate) fn parse_column<T>(id: Uuid, raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = String>,
{
    raw.parse()
        .map_err(|reason| RepositoryError::CorruptRow { id, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let app: AppError = RepositoryError::Caisse(CaisseError::NonPositiveAmount).into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = RepositoryError::Invoice(InvoiceError::NotFound(Uuid::nil())).into();
        assert_eq!(app.status_code(), 404);

        let app: AppError = RepositoryError::Database(DbErr::Custom("boom".into())).into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.public_message(), "An error occurred");
    }

    #[test]
    fn test_parse_column() {
        let ok: Result<agencia_core::caisse::CashCategory, _> =
            parse_column(Uuid::nil(), "autre_entree");
        assert!(ok.is_ok());

        let err = parse_column::<agencia_core::caisse::CashCategory>(Uuid::nil(), "nope")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::CorruptRow { .. }));
    }
}
