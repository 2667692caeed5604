use actix_web::{get, web, Responder};

use crate::{
    configuration::{AppState, State},
    controller::load_record,
    error::Error,
    model::{EntityKind, Position},
};

#[get("/positions/{id}")]
pub async fn index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner();
    let position: Position =
        load_record(&state, EntityKind::Position, &id).await?;

    Ok(web::Json(position))
}
