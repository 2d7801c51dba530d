//! Supplier repository and supplier ledger balance updates.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use agencia_core::caisse::{ensure_covers, CaisseError};
use agencia_core::counterparty::NewSupplier;

use super::error::RepositoryError;
use crate::entities::suppliers;

/// Which supplier balance an operation settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierBalance {
    /// `solde_crediteur`.
    Credit,
    /// `dette_fournisseur`.
    Debt,
}

impl SupplierBalance {
    const fn column(self) -> suppliers::Column {
        match self {
            Self::Credit => suppliers::Column::SoldeCrediteur,
            Self::Debt => suppliers::Column::DetteFournisseur,
        }
    }

    const fn read(self, model: &suppliers::Model) -> Decimal {
        match self {
            Self::Credit => model.solde_crediteur,
            Self::Debt => model.dette_fournisseur,
        }
    }
}

/// Supplier repository.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    db: DatabaseConnection,
}

impl SupplierRepository {
    /// Creates a new supplier repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a supplier.
    pub async fn create(
        &self,
        agency_id: Uuid,
        input: NewSupplier,
    ) -> Result<suppliers::Model, RepositoryError> {
        let now = Utc::now().into();
        let model = suppliers::ActiveModel {
            id: Set(Uuid::now_v7()),
            agency_id: Set(agency_id),
            nom: Set(input.nom),
            contact: Set(input.contact),
            solde_crediteur: Set(input.solde_crediteur),
            dette_fournisseur: Set(input.dette_fournisseur),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(agency_id = %agency_id, supplier_id = %model.id, "supplier created");
        Ok(model)
    }

    /// Lists an agency's suppliers by name.
    pub async fn list(&self, agency_id: Uuid) -> Result<Vec<suppliers::Model>, RepositoryError> {
        Ok(suppliers::Entity::find()
            .filter(suppliers::Column::AgencyId.eq(agency_id))
            .order_by_asc(suppliers::Column::Nom)
            .all(&self.db)
            .await?)
    }

    /// Gets a supplier.
    pub async fn get(
        &self,
        agency_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<suppliers::Model, RepositoryError> {
        find_supplier(&self.db, agency_id, supplier_id).await
    }
}

/// Loads a supplier inside the agency.
pub(crate) async fn find_supplier<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    supplier_id: Uuid,
) -> Result<suppliers::Model, RepositoryError> {
    suppliers::Entity::find_by_id(supplier_id)
        .filter(suppliers::Column::AgencyId.eq(agency_id))
        .one(conn)
        .await?
        .ok_or_else(|| CaisseError::SupplierNotFound(supplier_id).into())
}

/// Subtracts `amount` from a supplier balance in one conditional UPDATE.
///
/// The row only changes when the balance covers the amount, so two
/// concurrent remissions cannot overdraw it.
pub(crate) async fn settle_supplier_balance<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    supplier_id: Uuid,
    balance: SupplierBalance,
    amount: Decimal,
) -> Result<(), RepositoryError> {
    let column = balance.column();
    let result = suppliers::Entity::update_many()
        .col_expr(column, Expr::col(column).sub(amount))
        .col_expr(
            suppliers::Column::UpdatedAt,
            Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
        )
        .filter(suppliers::Column::Id.eq(supplier_id))
        .filter(suppliers::Column::AgencyId.eq(agency_id))
        .filter(column.gte(amount))
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        return Ok(());
    }

    let supplier = find_supplier(conn, agency_id, supplier_id).await?;
    let available = balance.read(&supplier);
    ensure_covers(available, amount)?;
    Err(CaisseError::InsufficientBalance {
        available,
        requested: amount,
    }
    .into())
}

/// Adds `amount` back to a supplier balance.
pub(crate) async fn restore_supplier_balance<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    supplier_id: Uuid,
    balance: SupplierBalance,
    amount: Decimal,
) -> Result<(), RepositoryError> {
    let column = balance.column();
    let result = suppliers::Entity::update_many()
        .col_expr(column, Expr::col(column).add(amount))
        .col_expr(
            suppliers::Column::UpdatedAt,
            Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
        )
        .filter(suppliers::Column::Id.eq(supplier_id))
        .filter(suppliers::Column::AgencyId.eq(agency_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(CaisseError::SupplierNotFound(supplier_id).into());
    }
    Ok(())
}
