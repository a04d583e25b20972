use actix_web::web::{self, Data, JsonConfig, PathConfig, QueryConfig, ServiceConfig};
use actix_web::{App, HttpResponse, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod format;
pub mod seed;
pub mod stats;
pub mod typedid;
pub mod utils;

use config::{Config, DatabaseBackend};
use database::{Database, MemoryDatabase, MongoDatabase};
use error::Error;

/// Registers the extractor error formats and every `/api` route.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        // format query errors with custom format
        Error::InvalidQuery(err).into()
    }))
    .service(
        web::scope("/api")
            // stats first so "stats" is never taken for a campaign id
            .service(stats::endpoints::get_overview_stats)
            .service(stats::endpoints::get_trend_stats)
            .service(stats::endpoints::get_period_stats)
            .service(campaign::endpoints::create_campaign)
            .service(campaign::endpoints::get_campaigns)
            .service(campaign::endpoints::get_campaign_by_id)
            .service(campaign::endpoints::update_campaign_status)
            .service(campaign::endpoints::get_campaign_stats),
    );
}

pub async fn not_found() -> HttpResponse {
    Error::PathDoesNotExist.error_response()
}

pub async fn run(config: Config) -> Result<(), Error> {
    let db: Box<dyn Database> = match config.backend {
        DatabaseBackend::Mongo => {
            info!("connecting to db: {}", config.mongo_uri);
            let db = Client::with_uri_str(&config.mongo_uri)
                .await?
                .database(&config.mongo_database);
            Box::new(MongoDatabase::initialize(db).await?)
        }
        DatabaseBackend::Memory => {
            info!("using in-memory db");
            Box::new(MemoryDatabase::new())
        }
    };

    if config.seed_on_start {
        seed::seed(&*db).await?;
    }

    let bind_address = config.bind_address;
    let db = Data::new(db);
    let config = Data::new(config);

    info!("listening on {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(config.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
            .default_service(web::to(not_found))
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
