//! Schema creation straight from the entity definitions.
//!
//! Production databases are migrated with [`crate::migration::Migrator`].
//! This path builds the same tables on any backend, which is what the
//! `sqlite::memory:` tests use.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

use crate::entities::{Cases, DonationHandovers, Donations, FollowupActions, UserRoles};

/// Creates every ledger table from its entity.
///
/// # Errors
///
/// Returns an error if a `CREATE TABLE` statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema.create_table_from_entity(Cases),
        schema.create_table_from_entity(Donations),
        schema.create_table_from_entity(DonationHandovers),
        schema.create_table_from_entity(FollowupActions),
        schema.create_table_from_entity(UserRoles),
    ];

    for statement in &statements {
        db.execute(backend.build(statement)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, EntityTrait, QuerySelect};

    use super::*;

    #[tokio::test]
    async fn test_create_tables_on_sqlite() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        create_tables(&db).await.unwrap();

        let cases = Cases::find().limit(1).all(&db).await.unwrap();
        assert!(cases.is_empty());
        let donations = Donations::find().limit(1).all(&db).await.unwrap();
        assert!(donations.is_empty());
    }
}
