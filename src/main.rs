mod config;
mod error;
mod handlers;
mod models;
mod scorer;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use config::ScorerConfig;
use scorer::ScreenService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ScorerConfig::from_env();
    info!(
        "scoring via `{} {}` in {}",
        config.interpreter,
        config.script,
        config.work_dir.display()
    );
    let service = web::Data::new(ScreenService::new(config));

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("{host}:{port}");
    info!("Server running at http://{bind_address}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(service.clone())
            .configure(handlers::routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
