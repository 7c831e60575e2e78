use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod auth;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod services;
mod stores;

use config::Config;
use db::create_mongodb_client;
use stores::Stores;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );

    let mongodb_db = create_mongodb_client(&config)
        .await
        .expect("Failed to create MongoDB client");
    let stores = Stores::mongo(&mongodb_db);

    log::info!("Database connection established, indexes ensured");

    let openapi = api::ApiDoc::openapi();

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let cors_origin = config.server.cors_origin.clone();

    HttpServer::new(move || {
        let cors = if cors_origin == "*" {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_origin(&cors_origin)
                .allow_any_method()
                .allow_any_header()
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(stores.clone()))
            .route(
                "/api/docs",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/api/docs/"))
                        .finish()
                }),
            )
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
