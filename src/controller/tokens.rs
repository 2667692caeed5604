use actix_web::{get, web, Responder};

use crate::{
    configuration::{AppState, State},
    controller::load_record,
    error::Error,
    model::{EntityKind, Token},
};

#[get("/tokens/{address}")]
pub async fn index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let address = path.into_inner().to_lowercase();
    let token: Token = load_record(&state, EntityKind::Token, &address).await?;

    Ok(web::Json(token))
}
