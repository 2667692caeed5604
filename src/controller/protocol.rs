use actix_web::{get, web, Responder};

use crate::{
    configuration::{AppState, State},
    controller::{load_record, parse_bucket},
    error::Error,
    model::{EntityKind, FinancialsDailySnapshot, LendingProtocol},
};

#[get("/protocol")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let id = &state.config.settings.protocol_id;
    let protocol: LendingProtocol =
        load_record(&state, EntityKind::Protocol, id).await?;

    Ok(web::Json(protocol))
}

#[get("/financials/{day}")]
pub async fn financials(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let day = parse_bucket(&path.into_inner())?;
    let id = format!("{}-{}", state.config.settings.protocol_id, day);
    let snapshot: FinancialsDailySnapshot =
        load_record(&state, EntityKind::FinancialsDailySnapshot, &id).await?;

    Ok(web::Json(snapshot))
}
