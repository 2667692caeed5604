mod changeset;
mod memory;
mod postgre;
mod store;

pub use self::{
    changeset::Changeset,
    memory::MemoryStore,
    postgre::{PoolOption, PoolType},
    store::EntityStore,
};
