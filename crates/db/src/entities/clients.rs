//! `SeaORM` Entity for clients table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    pub nom: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub solde_crediteur: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cash_operations::Entity")]
    CashOperations,
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
}

impl Related<super::cash_operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashOperations.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
