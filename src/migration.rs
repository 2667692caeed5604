//! Schema migrations for the Postgres entity store, embedded with refinery
//! and tracked in `refinery_schema_history`.

use refinery::embed_migrations;
use tokio_postgres::NoTls;
use tracing::{error, info};

use crate::error::Error;

embed_migrations!("migrations");

pub async fn run_migrations(database_url: &str) -> Result<(), Error> {
    info!("Running database migrations...");

    let config: tokio_postgres::Config = database_url.parse().map_err(|e| {
        Error::ConfigurationError(format!("Invalid database URL: {}", e))
    })?;

    let (mut client, connection) =
        config.connect(NoTls).await.map_err(|e| {
            Error::store_failure("migrate", format!("connect: {}", e))
        })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Migration connection error: {}", e);
        }
    });

    let report = migrations::runner()
        .run_async(&mut client)
        .await
        .map_err(|e| Error::store_failure("migrate", e))?;

    let applied = report.applied_migrations();
    if applied.is_empty() {
        info!("No new migrations to apply");
    } else {
        for migration in applied {
            info!(
                "Applied migration: V{:03}__{}",
                migration.version(),
                migration.name()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_migration_is_embedded() {
        let runner = migrations::runner();
        let embedded = runner.get_migrations();

        let versions: Vec<u32> = embedded.iter().map(|m| m.version()).collect();
        assert_eq!(versions, vec![1]);
        assert_eq!(embedded[0].name(), "entity");
    }
}
