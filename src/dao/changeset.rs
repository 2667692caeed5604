use std::collections::HashMap;

use crate::{
    dao::EntityStore,
    error::Error,
    model::{Entity, EntityKind, Record},
};

/// Unit of work for one event.
///
/// Every mutation of an event's cascade is staged here and reaches the
/// store only through [`Changeset::commit`], as one batch. Dropping a
/// changeset discards its staged writes, so a failed event leaves the
/// store exactly as the previous event left it.
pub struct Changeset<'a, S> {
    store: &'a S,
    staged: HashMap<(EntityKind, String), Entity>,
    journal: Vec<(EntityKind, String)>,
}

impl<'a, S: EntityStore> Changeset<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            staged: HashMap::new(),
            journal: Vec::new(),
        }
    }

    /// Staged writes shadow the store.
    pub async fn load<R: Record>(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<R>, Error> {
        if let Some(entity) = self.staged.get(&(kind, id.to_owned())) {
            return R::try_from(entity.clone()).map(Some);
        }

        match self.store.load(kind, id).await? {
            Some(entity) => R::try_from(entity).map(Some),
            None => Ok(None),
        }
    }

    pub fn save<R: Record>(&mut self, record: R) {
        let key = (record.kind(), record.id().to_owned());
        if !self.staged.contains_key(&key) {
            self.journal.push(key.clone());
        }
        self.staged.insert(key, record.into());
    }

    /// Entities staged so far, in the order they were first saved.
    pub fn journal(&self) -> &[(EntityKind, String)] {
        &self.journal
    }

    pub fn is_empty(&self) -> bool {
        self.journal.is_empty()
    }

    /// Writes every staged entity once and returns how many were written.
    pub async fn commit(mut self) -> Result<usize, Error> {
        let entities: Vec<Entity> = self
            .journal
            .iter()
            .filter_map(|key| self.staged.remove(key))
            .collect();

        self.store.commit(&entities).await?;
        Ok(entities.len())
    }
}
