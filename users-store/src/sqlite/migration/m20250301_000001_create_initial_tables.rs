use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customer::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customer::FirstName).string().not_null())
                    .col(ColumnDef::new(Customer::LastName).string().not_null())
                    .col(ColumnDef::new(Customer::Email).string().not_null())
                    .col(
                        ColumnDef::new(Customer::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customer::Password).string().not_null())
                    .col(ColumnDef::new(Customer::Salt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Address::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Address::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Address::CustomerId).string().not_null())
                    .col(ColumnDef::new(Address::Street).string().not_null())
                    .col(ColumnDef::new(Address::Number).string().not_null())
                    .col(ColumnDef::new(Address::Country).string().not_null())
                    .col(ColumnDef::new(Address::City).string().not_null())
                    .col(ColumnDef::new(Address::Postcode).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Card::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Card::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Card::CustomerId).string().not_null())
                    .col(ColumnDef::new(Card::LongNum).string().not_null())
                    .col(ColumnDef::new(Card::Expires).string().not_null())
                    .col(ColumnDef::new(Card::Ccv).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_customer_id")
                    .table(Address::Table)
                    .col(Address::CustomerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cards_customer_id")
                    .table(Card::Table)
                    .col(Card::CustomerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Card::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Address::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customer::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Customer {
    #[sea_orm(iden = "customers")]
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Username,
    Password,
    Salt,
}

#[derive(DeriveIden)]
enum Address {
    #[sea_orm(iden = "addresses")]
    Table,
    Id,
    CustomerId,
    Street,
    Number,
    Country,
    City,
    Postcode,
}

#[derive(DeriveIden)]
enum Card {
    #[sea_orm(iden = "cards")]
    Table,
    Id,
    CustomerId,
    LongNum,
    Expires,
    Ccv,
}
