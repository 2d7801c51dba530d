//! Client repository and client credit updates.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use agencia_core::caisse::{ensure_covers, CaisseError};
use agencia_core::counterparty::NewClient;

use super::error::RepositoryError;
use crate::entities::clients;

/// Client repository.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a client.
    pub async fn create(
        &self,
        agency_id: Uuid,
        input: NewClient,
    ) -> Result<clients::Model, RepositoryError> {
        let now = Utc::now().into();
        let model = clients::ActiveModel {
            id: Set(Uuid::now_v7()),
            agency_id: Set(agency_id),
            nom: Set(input.nom),
            email: Set(input.email),
            telephone: Set(input.telephone),
            solde_crediteur: Set(input.solde_crediteur),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(agency_id = %agency_id, client_id = %model.id, "client created");
        Ok(model)
    }

    /// Lists an agency's clients by name.
    pub async fn list(&self, agency_id: Uuid) -> Result<Vec<clients::Model>, RepositoryError> {
        Ok(clients::Entity::find()
            .filter(clients::Column::AgencyId.eq(agency_id))
            .order_by_asc(clients::Column::Nom)
            .all(&self.db)
            .await?)
    }

    /// Gets a client.
    pub async fn get(
        &self,
        agency_id: Uuid,
        client_id: Uuid,
    ) -> Result<clients::Model, RepositoryError> {
        find_client(&self.db, agency_id, client_id).await
    }
}

/// Loads a client inside the agency.
pub(crate) async fn find_client<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    client_id: Uuid,
) -> Result<clients::Model, RepositoryError> {
    clients::Entity::find_by_id(client_id)
        .filter(clients::Column::AgencyId.eq(agency_id))
        .one(conn)
        .await?
        .ok_or_else(|| CaisseError::ClientNotFound(client_id).into())
}

/// Adds `delta` to the client credit; a negative delta only applies when
/// the credit covers it.
pub(crate) async fn adjust_client_credit<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    client_id: Uuid,
    delta: Decimal,
) -> Result<(), RepositoryError> {
    let mut update = clients::Entity::update_many()
        .col_expr(
            clients::Column::SoldeCrediteur,
            Expr::col(clients::Column::SoldeCrediteur).add(delta),
        )
        .col_expr(
            clients::Column::UpdatedAt,
            Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
        )
        .filter(clients::Column::Id.eq(client_id))
        .filter(clients::Column::AgencyId.eq(agency_id));
    if delta < Decimal::ZERO {
        update = update.filter(clients::Column::SoldeCrediteur.gte(-delta));
    }

    if update.exec(conn).await?.rows_affected > 0 {
        return Ok(());
    }

    let client = find_client(conn, agency_id, client_id).await?;
    ensure_covers(client.solde_crediteur, -delta)?;
    Err(CaisseError::InsufficientBalance {
        available: client.solde_crediteur,
        requested: -delta,
    }
    .into())
}
