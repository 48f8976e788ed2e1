use crate::{
    errors::ServiceError,
    models::requests::{IssueQrQuery, VerifyQrRequest},
    routes::AppState,
};
use actix_web::{web, HttpResponse};
use validator::Validate;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/card/qr", web::get().to(get_qr_code))
        .route("/card/verify", web::post().to(verify_qr));
}

/// Issues a dynamic QR code for the card holder.
/// GET /api/v1/card/qr?user_id=...
async fn get_qr_code(
    state: web::Data<AppState>,
    query: web::Query<IssueQrQuery>,
) -> Result<HttpResponse, ServiceError> {
    let query = query.into_inner();
    query
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let qr = state.card_service.generate_dynamic_qr(&query.user_id)?;
    Ok(HttpResponse::Ok().json(qr))
}

/// Verifies a token read from a card. Rejections are still 200 responses.
/// POST /api/v1/card/verify
async fn verify_qr(state: web::Data<AppState>, req: web::Json<VerifyQrRequest>) -> HttpResponse {
    let verdict = state.card_service.verify_qr_token(&req.token);
    HttpResponse::Ok().json(verdict)
}
