//! # WriteFlow API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::RateLimitMiddleware;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting WriteFlow API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await.map_err(std::io::Error::other)?;
    let trust_proxy = config.trust_proxy_headers;

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(
                RateLimitMiddleware::new(state.rate_limiter.clone())
                    .trust_proxy_headers(trust_proxy),
            )
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .configure(|cfg| {
                state.register(cfg);
                handlers::configure_routes(cfg);
            })
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
