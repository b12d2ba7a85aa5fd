use crate::handlers;
use actix_web::{web, Scope};

pub fn config() -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health_check))
        // Every method reaches the handler so non-POST gets a JSON 405.
        .route("/chat", web::route().to(handlers::chat))
}
