use crate::{
    dao::{EntityStore, MemoryStore, PoolOption, PoolType},
    error::Error,
    model::{Entity, EntityKind, Table},
};

#[derive(Debug)]
pub struct DatabasePool {
    pub entity: Table<Entity>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(database_url: &str) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .map_err(|e| Error::store_failure("connect", e))?;

        let entity = Table::new(pool.clone());

        Ok(DatabasePool { entity, pool })
    }
}

impl EntityStore for DatabasePool {
    async fn load(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<Entity>, Error> {
        self.entity.get_one(kind, id).await
    }

    async fn commit(&self, entities: &[Entity]) -> Result<(), Error> {
        self.entity.upsert_many(entities).await
    }
}

/// The store selected by `STORE`.
#[derive(Debug)]
pub enum Storage {
    Memory(MemoryStore),
    Postgres(DatabasePool),
}

impl Storage {
    pub fn memory() -> Self {
        Storage::Memory(MemoryStore::new())
    }
}

impl EntityStore for Storage {
    async fn load(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<Entity>, Error> {
        match self {
            Storage::Memory(store) => store.load(kind, id).await,
            Storage::Postgres(store) => store.load(kind, id).await,
        }
    }

    async fn commit(&self, entities: &[Entity]) -> Result<(), Error> {
        match self {
            Storage::Memory(store) => store.commit(entities).await,
            Storage::Postgres(store) => store.commit(entities).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = Storage::memory();
        storage.store(Position::new("0x01", None).into()).await.unwrap();

        let loaded = storage.load(EntityKind::Position, "0x01").await.unwrap();
        assert_eq!(loaded.map(|entity| entity.kind()), Some(EntityKind::Position));
    }
}
