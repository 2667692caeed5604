use serde_json::Value;
use sqlx::types::Json;

use crate::{
    error::Error,
    model::{Entity, EntityKind, Table},
};

impl Table<Entity> {
    pub async fn get_one(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<Entity>, Error> {
        let row: Option<(Json<Value>,)> = sqlx::query_as(
            r#"
            SELECT "data" FROM "entity" WHERE "kind" = $1 AND "id" = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store_failure("load", e))?;

        match row {
            Some((Json(value),)) => Ok(Some(Entity::from_json(kind, value)?)),
            None => Ok(None),
        }
    }

    /// Upserts every entity inside one transaction; either all rows land or
    /// none do.
    pub async fn upsert_many(&self, data: &[Entity]) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::store_failure("commit", e))?;

        for entity in data {
            let value = entity.to_json()?;
            sqlx::query(
                r#"
                INSERT INTO "entity" ("kind", "id", "data", "updated_at")
                VALUES($1, $2, $3, now())
                ON CONFLICT ("kind", "id")
                DO UPDATE SET "data" = EXCLUDED."data", "updated_at" = now()
                "#,
            )
            .bind(entity.kind().as_str())
            .bind(entity.id())
            .bind(Json(value))
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::store_failure("commit", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::store_failure("commit", e))?;

        Ok(())
    }
}
