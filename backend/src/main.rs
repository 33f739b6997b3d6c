mod audit;
mod config;
mod db;
mod docx;
mod error;
mod services;
mod state;

use crate::audit::SqliteAuditRecorder;
use crate::config::AppConfig;
use crate::state::AppState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();

    // Schema first, so a broken database stops startup instead of the first request.
    if let Err(e) = db::open(&config.database_path).and_then(|conn| db::migrate(&conn)) {
        error!(
            "Cannot prepare database {}: {}",
            config.database_path.display(),
            e
        );
        return Err(io::Error::other(e));
    }
    std::fs::create_dir_all(&config.output_dir)?;

    let audit = Arc::new(SqliteAuditRecorder::new(
        config.database_path.clone(),
        config.operator.clone(),
    ));
    let json_limit = config.json_limit_bytes;
    let bind = (config.host.clone(), config.port);
    info!(
        "Server running at {} (database {}, output {})",
        config.bind_url(),
        config.database_path.display(),
        config.output_dir.display()
    );
    let state = AppState::new(config, audit);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(state.clone()))
            .service(services::templates::configure_routes())
            .service(services::schema::configure_routes())
            .service(services::mappings::configure_routes())
            .service(services::generation::configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}
