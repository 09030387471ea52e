use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    handlers::RequestUser,
    models::dto::request::{PaginationParams, SubmitAttemptRequest},
};

#[post("/api/quizzes/{quiz_id}/attempts")]
pub async fn start_attempt(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .test_attempt_service
        .start_attempt(&user.0, &quiz_id)
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[post("/api/attempts/{id}/submit")]
pub async fn submit_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitAttemptRequest>,
    user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .test_attempt_service
        .submit_attempt(&user.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/attempts/{id}")]
pub async fn get_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state.test_attempt_service.get_attempt(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[get("/api/attempts")]
pub async fn list_attempts(
    state: web::Data<AppState>,
    pagination: web::Query<PaginationParams>,
    user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .test_attempt_service
        .list_attempts(&user.0, &pagination)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/attempts/{id}/feedback")]
pub async fn regenerate_feedback(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let report = state
        .test_attempt_service
        .regenerate_feedback(&user.0, &id)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}
