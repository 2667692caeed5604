use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    dao::EntityStore,
    error::Error,
    model::{Entity, EntityKind},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: RwLock<HashMap<(EntityKind, String), Entity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

impl EntityStore for MemoryStore {
    async fn load(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<Entity>, Error> {
        let entities = self.entities.read().await;
        Ok(entities.get(&(kind, id.to_owned())).cloned())
    }

    async fn commit(&self, entities: &[Entity]) -> Result<(), Error> {
        let mut stored = self.entities.write().await;
        for entity in entities {
            stored.insert((entity.kind(), entity.id().to_owned()), entity.clone());
        }
        Ok(())
    }
}
