mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, SecurityConfig};
use handlers::health::not_found;
use routes::api;
use services::{AIService, CompletionProvider, OpenRouterClient};

#[derive(Clone)]
pub struct AppState {
    pub ai_service: AIService,
    pub max_body_size: usize,
    pub start_time: Instant,
}

fn build_cors(security: &SecurityConfig) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if security.allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    security
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting chat proxy on port {}",
        config.server.port
    );

    // The credential is optional at startup; chat requests fail until it is set.
    let provider: Option<Arc<dyn CompletionProvider>> =
        match OpenRouterClient::from_settings(&config.openrouter) {
            Ok(Some(client)) => Some(Arc::new(client)),
            Ok(None) => {
                warn!("OPENROUTER_API_KEY is not set; chat requests will be refused");
                None
            }
            Err(e) => {
                error!("Failed to initialize OpenRouter client: {}", e);
                std::process::exit(1);
            }
        };

    let state = AppState {
        ai_service: AIService::new(provider, config.chat.clone()),
        max_body_size: config.server.max_json_payload_size,
        start_time: Instant::now(),
    };

    let security = config.security.clone();

    // Create HTTP server
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(build_cors(&security))
            .wrap(Logger::default())
            .service(api::config())
            .default_service(web::route().to(not_found))
    })
    .bind(format!("{}:{}", config.server.host, config.server.port))?;

    info!(
        "Server started successfully at http://{}:{}",
        config.server.host, config.server.port
    );

    // Run the server
    server.workers(config.server.workers).run().await
}
