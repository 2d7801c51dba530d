//! `SeaORM` Entity for agents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "agents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    pub nom: String,
    pub email: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cash_operations::Entity")]
    CashOperations,
}

impl Related<super::cash_operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashOperations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
