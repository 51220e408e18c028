// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wolfhost::config::Config;
use wolfhost::{AppState, api, docs};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        log::error!("configuration error: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let port = config.port;

    let state = AppState::new(config).map_err(|e| {
        log::error!("startup error: {e}");
        std::io::Error::other(e.to_string())
    })?;
    log::info!(
        "spending ledger at {}, panel {}",
        state.ledger.path().display(),
        state.config.panel_base_url
    );
    let state = web::Data::new(state);

    log::info!("WolfHost API listening on 0.0.0.0:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .configure(api::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
