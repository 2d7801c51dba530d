//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    pub numero: String,
    pub kind: String,
    pub client_id: Option<Uuid>,
    pub fournisseur_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub montant_ht: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub montant_ttc: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub montant_paye: Decimal,
    pub statut: String,
    pub date_emission: Date,
    pub date_echeance: Option<Date>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::FournisseurId",
        to = "super::suppliers::Column::Id"
    )]
    Suppliers,
    #[sea_orm(has_many = "super::cash_operations::Entity")]
    CashOperations,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl Related<super::cash_operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashOperations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
