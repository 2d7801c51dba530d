//! Initial database migration.
//!
//! Creates the counterparty tables (suppliers, clients, agents), invoices and
//! the cash register journal.

use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Suppliers {
    Table,
    Id,
    AgencyId,
    Nom,
    Contact,
    SoldeCrediteur,
    DetteFournisseur,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Clients {
    Table,
    Id,
    AgencyId,
    Nom,
    Email,
    Telephone,
    SoldeCrediteur,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Agents {
    Table,
    Id,
    AgencyId,
    Nom,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    AgencyId,
    Numero,
    Kind,
    ClientId,
    FournisseurId,
    MontantHt,
    MontantTtc,
    MontantPaye,
    Statut,
    DateEmission,
    DateEcheance,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CashOperations {
    Table,
    Id,
    AgencyId,
    TypeOperation,
    Montant,
    Description,
    Categorie,
    ModePaiement,
    Date,
    Reference,
    AgentId,
    ClientId,
    FournisseurId,
    FactureId,
    RemboursementType,
    Annulee,
    AnnuleeLe,
    AnnuleePar,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

/// Precision of money columns. `SQLite` caps decimal precision at 16.
fn money_precision(backend: DatabaseBackend) -> u32 {
    match backend {
        DatabaseBackend::Sqlite => 16,
        DatabaseBackend::Postgres | DatabaseBackend::MySql => 18,
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let precision = money_precision(manager.get_database_backend());

        // ============================================================
        // PART 1: COUNTERPARTIES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Suppliers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Suppliers::AgencyId).uuid().not_null())
                    .col(ColumnDef::new(Suppliers::Nom).string().not_null())
                    .col(ColumnDef::new(Suppliers::Contact).string())
                    .col(
                        ColumnDef::new(Suppliers::SoldeCrediteur)
                            .decimal_len(precision, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Suppliers::DetteFournisseur)
                            .decimal_len(precision, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Suppliers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-suppliers-agency_id")
                    .table(Suppliers::Table)
                    .col(Suppliers::AgencyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::AgencyId).uuid().not_null())
                    .col(ColumnDef::new(Clients::Nom).string().not_null())
                    .col(ColumnDef::new(Clients::Email).string())
                    .col(ColumnDef::new(Clients::Telephone).string())
                    .col(
                        ColumnDef::new(Clients::SoldeCrediteur)
                            .decimal_len(precision, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-clients-agency_id")
                    .table(Clients::Table)
                    .col(Clients::AgencyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Agents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Agents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Agents::AgencyId).uuid().not_null())
                    .col(ColumnDef::new(Agents::Nom).string().not_null())
                    .col(ColumnDef::new(Agents::Email).string())
                    .col(
                        ColumnDef::new(Agents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: INVOICES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::AgencyId).uuid().not_null())
                    .col(ColumnDef::new(Invoices::Numero).string().not_null())
                    .col(ColumnDef::new(Invoices::Kind).string().not_null())
                    .col(ColumnDef::new(Invoices::ClientId).uuid())
                    .col(ColumnDef::new(Invoices::FournisseurId).uuid())
                    .col(
                        ColumnDef::new(Invoices::MontantHt)
                            .decimal_len(precision, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::MontantTtc)
                            .decimal_len(precision, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::MontantPaye)
                            .decimal_len(precision, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Invoices::Statut).string().not_null())
                    .col(ColumnDef::new(Invoices::DateEmission).date().not_null())
                    .col(ColumnDef::new(Invoices::DateEcheance).date())
                    .col(ColumnDef::new(Invoices::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Invoices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-client_id")
                            .from(Invoices::Table, Invoices::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-fournisseur_id")
                            .from(Invoices::Table, Invoices::FournisseurId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-agency_id-numero")
                    .table(Invoices::Table)
                    .col(Invoices::AgencyId)
                    .col(Invoices::Numero)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: CASH REGISTER
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(CashOperations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashOperations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashOperations::AgencyId).uuid().not_null())
                    .col(
                        ColumnDef::new(CashOperations::TypeOperation)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashOperations::Montant)
                            .decimal_len(precision, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashOperations::Description).string().not_null())
                    .col(ColumnDef::new(CashOperations::Categorie).string().not_null())
                    .col(ColumnDef::new(CashOperations::ModePaiement).string().not_null())
                    .col(ColumnDef::new(CashOperations::Date).date().not_null())
                    .col(ColumnDef::new(CashOperations::Reference).string())
                    .col(ColumnDef::new(CashOperations::AgentId).uuid())
                    .col(ColumnDef::new(CashOperations::ClientId).uuid())
                    .col(ColumnDef::new(CashOperations::FournisseurId).uuid())
                    .col(ColumnDef::new(CashOperations::FactureId).uuid())
                    .col(ColumnDef::new(CashOperations::RemboursementType).string())
                    .col(
                        ColumnDef::new(CashOperations::Annulee)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(CashOperations::AnnuleeLe).timestamp_with_time_zone())
                    .col(ColumnDef::new(CashOperations::AnnuleePar).uuid())
                    .col(ColumnDef::new(CashOperations::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(CashOperations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashOperations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_operations-agent_id")
                            .from(CashOperations::Table, CashOperations::AgentId)
                            .to(Agents::Table, Agents::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_operations-client_id")
                            .from(CashOperations::Table, CashOperations::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_operations-fournisseur_id")
                            .from(CashOperations::Table, CashOperations::FournisseurId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_operations-facture_id")
                            .from(CashOperations::Table, CashOperations::FactureId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_operations-agency_id-date")
                    .table(CashOperations::Table)
                    .col(CashOperations::AgencyId)
                    .col(CashOperations::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CashOperations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Agents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DatabaseBackend::Sqlite, 16)]
    #[case(DatabaseBackend::Postgres, 18)]
    fn test_money_precision(#[case] backend: DatabaseBackend, #[case] expected: u32) {
        assert_eq!(money_precision(backend), expected);
    }

    #[tokio::test]
    async fn test_up_and_down_on_sqlite() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        crate::migration::Migrator::up(&db, None).await.unwrap();
        crate::migration::Migrator::down(&db, None).await.unwrap();
    }
}
