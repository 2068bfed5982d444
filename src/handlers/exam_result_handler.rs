use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{
        CreateExamResultRequest, ExamResultQuery, GradingPreviewRequest, PaginationParams,
        RecordStudentResultsRequest, StudentResultInput, UpdateExamResultRequest,
        UpdateExamStatusRequest,
    },
};

#[post("/api/exam-results")]
pub async fn create_exam_result(
    state: web::Data<AppState>,
    request: web::Json<CreateExamResultRequest>,
) -> Result<HttpResponse, AppError> {
    let exam = state
        .exam_result_service
        .create_exam_result(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(exam))
}

#[get("/api/exam-results")]
pub async fn list_exam_results(
    state: web::Data<AppState>,
    query: web::Query<ExamResultQuery>,
) -> Result<HttpResponse, AppError> {
    let page = state
        .exam_result_service
        .list_exam_results(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/exam-results/{id}")]
pub async fn get_exam_result(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let exam = state.exam_result_service.get_exam_result(&id).await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[put("/api/exam-results/{id}")]
pub async fn update_exam_result(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateExamResultRequest>,
) -> Result<HttpResponse, AppError> {
    let exam = state
        .exam_result_service
        .update_exam_result(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[delete("/api/exam-results/{id}")]
pub async fn delete_exam_result(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let response = state.exam_result_service.delete_exam_result(&id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[put("/api/exam-results/{id}/student-results")]
pub async fn record_student_results(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<RecordStudentResultsRequest>,
) -> Result<HttpResponse, AppError> {
    let exam = state
        .exam_result_service
        .record_student_results(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[post("/api/exam-results/{id}/student-results")]
pub async fn upsert_student_result(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<StudentResultInput>,
) -> Result<HttpResponse, AppError> {
    let exam = state
        .exam_result_service
        .upsert_student_result(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[delete("/api/exam-results/{id}/student-results/{student}")]
pub async fn remove_student_result(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (id, student) = path.into_inner();
    let exam = state
        .exam_result_service
        .remove_student_result(&id, &student)
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[put("/api/exam-results/{id}/status")]
pub async fn set_exam_status(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateExamStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let exam = state
        .exam_result_service
        .set_status(&id, request.status)
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[get("/api/students/{student}/results")]
pub async fn get_student_results(
    state: web::Data<AppState>,
    student: web::Path<String>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let reports = state
        .exam_result_service
        .results_for_student(&student, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(reports))
}

#[post("/api/grading/preview")]
pub async fn preview_grading(
    state: web::Data<AppState>,
    request: web::Json<GradingPreviewRequest>,
) -> Result<HttpResponse, AppError> {
    let preview = state.exam_result_service.preview(request.into_inner())?;
    Ok(HttpResponse::Ok().json(preview))
}
