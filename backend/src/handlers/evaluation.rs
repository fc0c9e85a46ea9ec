//! HTTP handlers for tasting record management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Evaluation, EvaluationSummary, NewEvaluation, PaginatedResponse};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::{EvaluationFilter, EvaluationService},
    AppState,
};

/// Score and store a new evaluation
pub async fn create_evaluation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<NewEvaluation>,
) -> AppResult<(StatusCode, Json<Evaluation>)> {
    let service = EvaluationService::new(state.db);
    let evaluation = service.create(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

/// List the caller's evaluations, newest first
pub async fn list_evaluations(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<EvaluationFilter>,
) -> AppResult<Json<PaginatedResponse<EvaluationSummary>>> {
    let service = EvaluationService::new(state.db);
    let page = service.list(current_user.0.user_id, &filter).await?;
    Ok(Json(page))
}

/// Get an evaluation with all cups
pub async fn get_evaluation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(evaluation_id): Path<Uuid>,
) -> AppResult<Json<Evaluation>> {
    let service = EvaluationService::new(state.db);
    let evaluation = service.get(current_user.0.user_id, evaluation_id).await?;
    Ok(Json(evaluation))
}

/// Delete an evaluation
pub async fn delete_evaluation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(evaluation_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = EvaluationService::new(state.db);
    service.delete(current_user.0.user_id, evaluation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the favorite flag
pub async fn toggle_favorite(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(evaluation_id): Path<Uuid>,
) -> AppResult<Json<Evaluation>> {
    let service = EvaluationService::new(state.db);
    let evaluation = service
        .toggle_favorite(current_user.0.user_id, evaluation_id)
        .await?;
    Ok(Json(evaluation))
}
