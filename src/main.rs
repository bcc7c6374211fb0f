use std::time::Duration;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::app_config::AppConfig;
use crate::database::{setup_database, shutdown_database};
use crate::logger::init_logger;
use crate::services::activity_service::ActivityService;
use crate::services::channel_adapter::ChannelRegistry;
use crate::services::confirmation_service::ConfirmationService;
use crate::services::job_service::JobService;

mod app;
mod config;
mod database;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

/// Tiempo máximo para terminar auditorías pendientes al apagar
const AUDIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env()?;

    // Conectarnos a la DB (verificación + migraciones, una sola vez)
    let db_pool = setup_database(&config.database_url).await?;

    let job_service = JobService::new(db_pool.clone());
    let activity_service = ActivityService::new(db_pool.clone());

    // Adaptadores de canal: los que no tengan credenciales quedan deshabilitados
    let channels = ChannelRegistry::from_config(&config);

    let confirmation_service = ConfirmationService::new(
        job_service,
        channels,
        activity_service.clone(),
        config.timeouts,
    );

    // Levantar servidor
    log::info!(
        "Levantando servidor en {}:{}",
        config.bind_host,
        config.bind_port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(confirmation_service.clone()))
            .configure(app::init_app)
    })
    .workers(config.http_workers)
    .bind((config.bind_host.as_str(), config.bind_port))?
    .run()
    .await?;

    // Apagado: terminar auditorías pendientes antes de cerrar el pool
    activity_service.drain(AUDIT_DRAIN_TIMEOUT).await;
    shutdown_database(db_pool).await;
    Ok(())
}
