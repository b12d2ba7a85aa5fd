use actix_web::{web, HttpResponse, Result};

use crate::models::{ErrorResponse, HealthResponse};
use crate::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        api_key_configured: state.ai_service.is_configured(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}

pub async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(ErrorResponse::new("Endpoint not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatSettings;
    use crate::routes::api;
    use crate::services::AIService;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use std::time::Instant;

    #[actix_web::test]
    async fn health_reports_missing_key() {
        let state = AppState {
            ai_service: AIService::new(None, ChatSettings::default()),
            max_body_size: 1024,
            start_time: Instant::now(),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(api::config())
                .default_service(web::route().to(not_found)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["api_key_configured"], false);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Endpoint not found");
    }
}
