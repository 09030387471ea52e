use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    handlers::RequestUser,
    models::dto::request::{CreateQuizRequest, PaginationParams},
};

#[post("/api/quizzes")]
pub async fn create_quiz(
    state: web::Data<AppState>,
    request: web::Json<CreateQuizRequest>,
    user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .quiz_service
        .create_quiz(&user.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    _user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[get("/api/quizzes")]
pub async fn list_quizzes(
    state: web::Data<AppState>,
    pagination: web::Query<PaginationParams>,
    user: RequestUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .quiz_service
        .list_quizzes(&user.0, &pagination)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.db.health_check().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}
