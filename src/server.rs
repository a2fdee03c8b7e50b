//! Server assembly: config, storage, and the actix application.

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::config::Config;
use crate::handlers;
use crate::storage::create_storage;
use crate::telemetry::init_telemetry;

/// Start the HTTP server and block until shutdown.
pub async fn run() -> std::io::Result<()> {
    init_telemetry();

    let config = Config::from_env().unwrap_or_default();

    let storage = create_storage(&config.database.url)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    storage
        .init()
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let addr = (config.server.host.clone(), config.server.port);
    tracing::info!(host = %addr.0, port = addr.1, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(handlers::configure)
    })
    .bind(addr)?
    .run()
    .await
}
