#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};

mod error;
mod routes;
mod state;

use error::AppError;
use logger::init_tracing;
use state::AppState;
use vigil_service::config::Config;
use vigil_service::database::{Store, open_store};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config_path = std::env::var_os("VIGIL_CONFIG").map(PathBuf::from);
    let config = Config::load(config_path)?;
    let store: Arc<dyn Store> =
        Arc::new(open_store(&config.database.path).await.map_err(AppError::Database)?);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = web::Data::new(AppState::new(store, config.server.history_days));

    tracing::info!(%addr, database = %config.database.path, "Starting status API");
    run_server(addr, state).await
}

async fn run_server(addr: SocketAddr, state: web::Data<AppState>) -> Result<(), AppError> {
    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
