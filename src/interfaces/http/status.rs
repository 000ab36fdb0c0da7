use actix_web::{get, web, HttpResponse, Responder};

use super::HttpState;

/// Health check endpoint. Never fails: all probes are wrapped, and the
/// response is valid JSON even when the database and LLM are both down.
#[get("/status")]
pub async fn get_status(data: web::Data<HttpState>) -> impl Responder {
    let status = data.health_service.full_status().await;
    HttpResponse::Ok().json(status)
}
