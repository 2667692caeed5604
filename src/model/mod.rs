//! Aggregate entities
//!
//! Entity structs are consolidated in models.rs, the storage envelope
//! (`Entity`, `EntityKind`, `Record`) lives in entity.rs and table.rs
//! binds a struct to a Postgres pool.

mod entity;
mod models;
mod table;

pub use entity::{Entity, EntityKind, Record};

pub use models::*;

pub use table::Table;
