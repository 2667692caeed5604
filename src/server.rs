use actix_cors::Cors;
use actix_web::{
    dev::Server, http::header, middleware, web, App, HttpServer,
};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    controller::{market, positions, protocol, tokens, version},
    error::Error,
};

pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let app = app_state.clone();
    tokio::spawn(async move {
        let server = init_server(app)?;
        server.await?;
        Ok(())
    })
    .await?
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(protocol::index)
            .service(protocol::financials)
            .service(market::index)
            .service(market::daily)
            .service(market::hourly)
            .service(positions::index)
            .service(tokens::index)
            .service(version::index),
    );
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;
    info!("Serving API on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let app = app_state.clone();
        let allowed_cors = String::from("*");
        let cors_access_all =
            app.config.allowed_origins.contains(&allowed_cors);
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                if cors_access_all {
                    return true;
                }
                let allowed = &app.config.allowed_origins;
                if let Ok(origin) = origin.to_str() {
                    return allowed.iter().any(|item| item == origin);
                }
                false
            })
            .allowed_methods(vec!["GET"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT])
            .allowed_header(header::CONTENT_TYPE);

        App::new()
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes)
    })
    .bind((host, port))?
    .disable_signals()
    .run();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};

    use super::*;
    use crate::{
        configuration::{Config, IndexerSettings},
        dao::EntityStore,
        helpers::{SnapshotPeriod, StoreKind},
        model::{MarketMetrics, MarketSnapshot, PeriodTotals},
        provider::{Storage, HTTP},
    };

    fn app_state() -> AppState<State> {
        let config = Config {
            store: StoreKind::Memory,
            database_url: None,
            server_host: String::from("127.0.0.1"),
            port: 0,
            allowed_origins: vec![String::from("*")],
            price_source_url: None,
            settings: IndexerSettings::default(),
        };
        AppState::new(State {
            config,
            store: Storage::memory(),
            http: HTTP::new(None),
        })
    }

    #[actix_web::test]
    async fn test_missing_market_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(routes),
        )
        .await;

        let request = test::TestRequest::get().uri("/api/market").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_malformed_bucket_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(routes),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/api/market/daily/yesterday")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_daily_snapshot_by_bucket() {
        let state = app_state();
        let snapshot = MarketSnapshot {
            id: String::from("active-pool-19675"),
            period: SnapshotPeriod::Daily,
            protocol: String::from("cdp-manager"),
            market: String::from("active-pool"),
            block_number: 18_000_000,
            timestamp: 1_700_000_000,
            metrics: MarketMetrics::default(),
            period_totals: PeriodTotals::default(),
        };
        state.store.store(snapshot.clone().into()).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(routes),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/api/market/daily/19675")
            .to_request();
        let body: MarketSnapshot = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, snapshot);

        let request = test::TestRequest::get()
            .uri("/api/market/hourly/19675")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_version() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(routes),
        )
        .await;

        let request = test::TestRequest::get().uri("/api/version").to_request();
        let body: version::Response =
            test::call_and_read_body_json(&app, request).await;
        assert_eq!(body.indexer_version, env!("CARGO_PKG_VERSION"));
    }
}
