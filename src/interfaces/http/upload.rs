use actix_web::{post, web, HttpResponse, Responder};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use super::{chart_payload, error_response, HttpState};

#[derive(Debug, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 255, message = "filename must be 1-255 characters"))]
    pub filename: String,

    /// Raw file bytes, base64-encoded
    #[validate(length(min = 1, message = "content is required"))]
    pub content_base64: String,
}

#[post("/upload")]
pub async fn upload(data: web::Data<HttpState>, req: web::Json<UploadRequest>) -> impl Responder {
    if let Err(e) = req.validate() {
        return HttpResponse::BadRequest().json(json!({ "error": e.to_string() }));
    }

    let content = match base64::engine::general_purpose::STANDARD.decode(&req.content_base64) {
        Ok(bytes) => bytes,
        Err(_) => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "Content is not valid base64" }))
        }
    };

    info!(filename = %req.filename, bytes = content.len(), "Upload received");

    match data
        .report_service
        .analyze_upload(&req.filename, &content)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "success": true,
            "report_id": outcome.report_id,
            "filename": outcome.filename,
            "summary": outcome.digest,
            "insights": outcome.insights,
            "insights_error": outcome.insights_error,
            "chart_data": chart_payload(outcome.chart.as_ref()),
        })),
        Err(e) => error_response(&e),
    }
}
