use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // name and age stay nullable: rows missing either one are skipped by the poller
        manager
            .create_table(
                Table::create()
                    .table((Alias::new("fanout_relay"), Websocket::Table))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Websocket::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Websocket::Name).text().null())
                    .col(ColumnDef::new(Websocket::Age).text().null())
                    .col(
                        ColumnDef::new(Websocket::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table((Alias::new("fanout_relay"), Websocket::Table))
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Websocket {
    Table,
    Id,
    Name,
    Age,
    CreatedAt,
}
