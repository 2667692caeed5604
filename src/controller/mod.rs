//! Read-only API over the stored aggregates.

pub mod market;
pub mod positions;
pub mod protocol;
pub mod tokens;
pub mod version;

use actix_web::web;

use crate::{
    configuration::{AppState, State},
    dao::EntityStore,
    error::Error,
    model::{EntityKind, Record},
};

async fn load_record<R: Record>(
    state: &web::Data<AppState<State>>,
    kind: EntityKind,
    id: &str,
) -> Result<R, Error> {
    match state.store.load(kind, id).await? {
        Some(entity) => R::try_from(entity),
        None => Err(Error::NotFound {
            kind,
            id: id.to_owned(),
        }),
    }
}

fn parse_bucket(value: &str) -> Result<u64, Error> {
    Ok(value.trim().parse::<u64>()?)
}
