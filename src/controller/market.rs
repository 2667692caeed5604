use actix_web::{get, web, Responder};

use crate::{
    configuration::{AppState, State},
    controller::{load_record, parse_bucket},
    error::Error,
    helpers::SnapshotPeriod,
    model::{EntityKind, Market, MarketSnapshot},
};

#[get("/market")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let id = &state.config.settings.market_id;
    let market: Market = load_record(&state, EntityKind::Market, id).await?;

    Ok(web::Json(market))
}

#[get("/market/daily/{day}")]
pub async fn daily(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    snapshot(&state, SnapshotPeriod::Daily, &path.into_inner()).await
}

#[get("/market/hourly/{hour}")]
pub async fn hourly(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    snapshot(&state, SnapshotPeriod::Hourly, &path.into_inner()).await
}

async fn snapshot(
    state: &web::Data<AppState<State>>,
    period: SnapshotPeriod,
    bucket: &str,
) -> Result<web::Json<MarketSnapshot>, Error> {
    let bucket = parse_bucket(bucket)?;
    let id = format!("{}-{}", state.config.settings.market_id, bucket);
    let snapshot: MarketSnapshot =
        load_record(state, EntityKind::market_snapshot(period), &id).await?;

    Ok(web::Json(snapshot))
}
