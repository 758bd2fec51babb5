//! Optimistic lock counter on donations.
//!
//! Every write to a donation bumps `version`; handover writes update the
//! running total only if the version they read is still current.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(VERSION_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "ALTER TABLE donations DROP CONSTRAINT IF EXISTS chk_donations_handed_over; \
             ALTER TABLE donations DROP COLUMN IF EXISTS version;",
        )
        .await?;
        Ok(())
    }
}

const VERSION_SQL: &str = r"
ALTER TABLE donations ADD COLUMN version BIGINT NOT NULL DEFAULT 0;

-- Running total never exceeds the pledge
ALTER TABLE donations ADD CONSTRAINT chk_donations_handed_over
    CHECK (total_handed_over >= 0 AND total_handed_over <= amount);
";
