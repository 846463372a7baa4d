use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS fanout_relay;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO fanout_relay, public;")
            .await?;

        // Queries run as the `relay` role
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    GRANT ALL ON SCHEMA fanout_relay TO relay;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA fanout_relay GRANT ALL ON TABLES TO relay;
                END $$;
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA fanout_relay REVOKE ALL ON TABLES FROM relay;
                    REVOKE ALL ON SCHEMA fanout_relay FROM relay;
                END $$;
            "#,
            )
            .await?;

        // CASCADE removes the websocket table too
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS fanout_relay CASCADE;")
            .await?;

        Ok(())
    }
}
