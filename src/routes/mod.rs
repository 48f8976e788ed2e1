use crate::errors::ServiceError;
use crate::models::responses::HealthResponse;
use crate::services::card_service::DigitalCardService;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

pub mod card;

#[derive(Clone)]
pub struct AppState {
    pub card_service: Arc<DigitalCardService>,
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Extractor failures use the same JSON error body as handler errors
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into());
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into());

    cfg.app_data(query_config)
        .app_data(json_config)
        .route("/health", web::get().to(health))
        .service(web::scope("/api/v1").configure(card::init_routes));
}

/// GET /health
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
