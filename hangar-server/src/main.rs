#![deny(missing_docs)]
//! Hangar server executable.
//!
//! Hosts the ship registry REST endpoints under `/rest`.

mod config;
mod db;
mod models;
mod openapi;
mod routes;
mod schema;
mod store;

#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use hangar_core::{MemoryShipStore, ShipService, ShipStore};

#[cfg(not(test))]
use crate::config::{ServerConfig, StoreBackend};
#[cfg(not(test))]
use crate::db::init_pool;
#[cfg(not(test))]
use crate::routes::AppState;
#[cfg(not(test))]
use crate::store::PgShipStore;

#[cfg(not(test))]
fn open_store(config: &ServerConfig) -> std::io::Result<Arc<dyn ShipStore>> {
    match config.store {
        StoreBackend::Memory => {
            log::warn!("using the in-memory ship store; data is lost on shutdown");
            Ok(Arc::new(MemoryShipStore::new()))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| std::io::Error::other("DATABASE_URL must be set"))?;
            let pool = init_pool(database_url).map_err(std::io::Error::other)?;
            Ok(Arc::new(PgShipStore::new(pool)))
        }
    }
}

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;
    let store = open_store(&config)?;
    let state = web::Data::new(AppState {
        ships: ShipService::new(store),
    });

    let allowed_origins = config.allowed_origins.clone();
    log::info!("listening on {}:{}", config.host, config.port);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(routes::configure)
        })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
