use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::{error_response, HttpState};

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 3, max = 300, message = "question must be 3-300 characters"))]
    pub question: String,
}

/// Q&A history for a report, oldest first
#[get("/questions/{report_id}")]
pub async fn get_questions(data: web::Data<HttpState>, path: web::Path<i64>) -> impl Responder {
    match data.report_service.list_questions(path.into_inner()).await {
        Ok(turns) => HttpResponse::Ok().json(turns),
        Err(e) => error_response(&e),
    }
}

/// Ask a follow-up question grounded in the report's digest and history
#[post("/questions/{report_id}")]
pub async fn ask_question(
    data: web::Data<HttpState>,
    path: web::Path<i64>,
    req: web::Json<AskRequest>,
) -> impl Responder {
    if let Err(e) = req.validate() {
        return HttpResponse::BadRequest().json(json!({ "error": e.to_string() }));
    }

    match data
        .report_service
        .ask(path.into_inner(), &req.question)
        .await
    {
        Ok(turn) => HttpResponse::Created().json(turn),
        Err(e) => error_response(&e),
    }
}
