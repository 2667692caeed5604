use std::future::Future;

use crate::{
    error::Error,
    model::{Entity, EntityKind},
};

/// Persistent key-value mapping of entities.
///
/// Loads must observe every prior commit from the same process. `commit`
/// is the only durability boundary and writes its batch atomically.
pub trait EntityStore: Send + Sync {
    fn load(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, Error>> + Send;

    fn commit(
        &self,
        entities: &[Entity],
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn store(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<(), Error>> + Send {
        async move { self.commit(std::slice::from_ref(&entity)).await }
    }
}
