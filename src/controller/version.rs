use actix_web::{get, web, Responder};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/version")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let settings = &state.config.settings;

    Ok(web::Json(Response {
        indexer_version: settings.indexer_version().to_owned(),
        schema_version: settings.schema_version.to_owned(),
        methodology_version: settings.methodology_version.to_owned(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub indexer_version: String,
    pub schema_version: String,
    pub methodology_version: String,
}
