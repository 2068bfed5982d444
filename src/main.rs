use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use school_results_server::{
    app_state::AppState, config::Config, graphql, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    config.validate().map_err(std::io::Error::other)?;

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let cors_origin = config.cors_allowed_origin.clone();

    let state = AppState::new(config)
        .await
        .map_err(std::io::Error::other)?;
    let schema = graphql::create_schema(state.clone());

    log::info!("Starting HTTP server on {}:{}", host, port);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", host, port);

    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(3600),
            None => Cors::permissive(),
        };

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(schema.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
            .configure(graphql::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
