use actix_web::{delete, get, web, HttpResponse, Responder};
use serde_json::json;

use super::{chart_payload, error_response, HttpState};

#[get("/reports")]
pub async fn list_reports(data: web::Data<HttpState>) -> impl Responder {
    match data.report_service.list_reports().await {
        Ok(reports) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": reports.len(),
            "reports": reports,
        })),
        Err(e) => error_response(&e),
    }
}

#[get("/reports/{report_id}")]
pub async fn get_report(data: web::Data<HttpState>, path: web::Path<i64>) -> impl Responder {
    let report_id = path.into_inner();

    match data.report_service.get_report(report_id).await {
        Ok(report) => HttpResponse::Ok().json(json!({
            "success": true,
            "report": {
                "id": report.id,
                "filename": report.filename,
                "summary": report.digest,
                "insights": report.insights,
                "insights_error": report.insights_error,
                "chart_data": chart_payload(report.chart.as_ref()),
                "created_at": report.created_at,
            },
        })),
        Err(e) => error_response(&e),
    }
}

#[delete("/reports/{report_id}")]
pub async fn delete_report(data: web::Data<HttpState>, path: web::Path<i64>) -> impl Responder {
    match data.report_service.delete_report(path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(e) => error_response(&e),
    }
}
