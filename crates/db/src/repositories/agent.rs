//! Agent repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use agencia_core::caisse::CaisseError;
use agencia_core::counterparty::NewAgent;

use super::error::RepositoryError;
use crate::entities::agents;

/// Agent repository.
#[derive(Debug, Clone)]
pub struct AgentRepository {
    db: DatabaseConnection,
}

impl AgentRepository {
    /// Creates a new agent repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an agent.
    pub async fn create(
        &self,
        agency_id: Uuid,
        input: NewAgent,
    ) -> Result<agents::Model, RepositoryError> {
        let model = agents::ActiveModel {
            id: Set(Uuid::now_v7()),
            agency_id: Set(agency_id),
            nom: Set(input.nom),
            email: Set(input.email),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(agency_id = %agency_id, agent_id = %model.id, "agent created");
        Ok(model)
    }

    /// Lists an agency's agents by name.
    pub async fn list(&self, agency_id: Uuid) -> Result<Vec<agents::Model>, RepositoryError> {
        Ok(agents::Entity::find()
            .filter(agents::Column::AgencyId.eq(agency_id))
            .order_by_asc(agents::Column::Nom)
            .all(&self.db)
            .await?)
    }
}

/// Loads an agent inside the agency.
pub(crate) async fn find_agent<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
    agent_id: Uuid,
) -> Result<agents::Model, RepositoryError> {
    agents::Entity::find_by_id(agent_id)
        .filter(agents::Column::AgencyId.eq(agency_id))
        .one(conn)
        .await?
        .ok_or_else(|| CaisseError::AgentNotFound(agent_id).into())
}
