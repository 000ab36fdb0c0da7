pub mod export;
pub mod questions;
pub mod reports;
pub mod status;
pub mod upload;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpResponse, HttpServer};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::health_service::HealthService;
use crate::application::use_cases::report_service::ReportService;
use crate::domain::chart::ChartSpec;
use crate::domain::error::AppError;

pub struct HttpState {
    pub report_service: Arc<ReportService>,
    pub health_service: Arc<HealthService>,
}

/// Map an AppError to a stable JSON error response. Internal detail stays in
/// the server log; the boundary only ever sees fixed messages.
pub fn error_response(err: &AppError) -> HttpResponse {
    match err {
        AppError::Format(msg)
        | AppError::EmptyDataset(msg)
        | AppError::SizeLimit(msg)
        | AppError::ValidationError(msg) => {
            HttpResponse::BadRequest().json(json!({ "error": msg }))
        }
        AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "error": msg })),
        AppError::GenerationUnavailable(_) => {
            error!(error = %err, "Generation service unavailable");
            HttpResponse::ServiceUnavailable()
                .json(json!({ "error": "Insight generation is temporarily unavailable" }))
        }
        AppError::MalformedInsight(_) => {
            error!(error = %err, "Generation service returned malformed output");
            HttpResponse::BadGateway()
                .json(json!({ "error": "Insight generation returned unusable output" }))
        }
        AppError::DatabaseError(_) | AppError::Internal(_) => {
            error!(error = %err, "Request failed");
            HttpResponse::InternalServerError().json(json!({ "error": "Internal server error" }))
        }
    }
}

/// Chart payload with the "has numeric data" flag the rendering layer keys on
pub fn chart_payload(chart: Option<&ChartSpec>) -> serde_json::Value {
    match chart {
        Some(spec) => {
            let mut payload = serde_json::to_value(spec).unwrap_or_else(|_| json!({}));
            if let Some(obj) = payload.as_object_mut() {
                obj.insert("has_numeric".to_string(), json!(true));
            }
            payload
        }
        None => json!({
            "has_numeric": false,
            "message": "No numeric columns found for charting"
        }),
    }
}

pub fn start_server(
    state: web::Data<HttpState>,
    bind_address: &str,
    port: u16,
    json_limit: usize,
) -> std::io::Result<Server> {
    let bind = (bind_address.to_string(), port);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local analysis tool, allow all origins

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(json_limit))
            .service(
                web::scope("/api")
                    .service(upload::upload)
                    .service(reports::list_reports)
                    .service(reports::get_report)
                    .service(reports::delete_report)
                    .service(questions::get_questions)
                    .service(questions::ask_question)
                    .service(export::export_text)
                    .service(export::download_report)
                    .service(status::get_status),
            )
    })
    .bind(bind)?
    .run();

    Ok(server)
}
