use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use health_registry::{
    config::AppConfig,
    db::schema::init_db,
    routes,
    state::AppState,
    utils::ensure_data_dir,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    ensure_data_dir(&config.database_path)?;
    // Create the schema up front so a bad path fails at startup.
    init_db(&config.database_path).map_err(|e| {
        error!("Failed to open database {:?}: {}", config.database_path, e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let host = config.host.clone();
    let port = config.port;
    let state = web::Data::new(AppState::new(config));

    info!("Starting server on http://{}:{}...", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(routes::session_middleware(&state.config))
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
