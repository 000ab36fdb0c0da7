use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use super::{error_response, HttpState};
use crate::application::use_cases::export_service::ExportService;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub report_id: i64,
}

#[post("/export/text")]
pub async fn export_text(
    data: web::Data<HttpState>,
    req: web::Json<ExportRequest>,
) -> impl Responder {
    match data.report_service.get_report(req.report_id).await {
        Ok(report) => HttpResponse::Ok().json(json!({
            "success": true,
            "formatted_text": ExportService::generate_text_report(&report),
        })),
        Err(e) => error_response(&e),
    }
}

/// Download the report as a text file attachment
#[get("/export/download/{report_id}")]
pub async fn download_report(data: web::Data<HttpState>, path: web::Path<i64>) -> impl Responder {
    match data.report_service.get_report(path.into_inner()).await {
        Ok(report) => {
            let text = ExportService::generate_text_report(&report);
            let filename = ExportService::download_filename(&report.filename);
            HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(filename)],
                })
                .body(text)
        }
        Err(e) => error_response(&e),
    }
}
