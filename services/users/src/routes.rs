//! User service routes

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    models::{DateRange, UserDraft},
    state::AppState,
};

/// Query parameters accepted by the single-field patch endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Create the router for the user service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/users",
            get(get_users_by_birth_date_range).post(create_user),
        )
        .route(
            "/api/users/:id",
            get(get_user).put(replace_user).delete(delete_user),
        )
        .route("/api/users/:id/first-name", patch(update_first_name))
        .route("/api/users/:id/last-name", patch(update_last_name))
        .route("/api/users/:id/email", patch(update_email))
        .route("/api/users/:id/birth-date", patch(update_birth_date))
        .route("/api/users/:id/address", patch(update_address))
        .route("/api/users/:id/phone", patch(update_phone))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "user-service"
    }))
}

fn required_param<T>(value: Option<T>, name: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::BadRequest(format!("Required parameter '{}' is not present", name)))
}

/// Answer with every field violation of a candidate at once
fn reject_invalid(state: &AppState, draft: &UserDraft) -> ApiResult<()> {
    let service = &state.user_service;
    let violations = service.validator().violations(draft, service.today());

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(violations))
    }
}

/// List users born within an optional date window
pub async fn get_users_by_birth_date_range(
    State(state): State<AppState>,
    query: Result<Query<DateRange>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(range) = query?;
    let users = state.user_service.find_by_birth_date_range(&range).await?;

    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let user = state.user_service.get_by_id(id).await?;

    Ok(Json(user))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = payload?;
    reject_invalid(&state, &draft)?;

    let user = state.user_service.create(&draft).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace every field of a user
pub async fn replace_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(draft) = payload?;
    reject_invalid(&state, &draft)?;

    let user = state.user_service.replace(id, &draft).await?;

    Ok(Json(user))
}

/// Delete a user by ID
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    state.user_service.delete_by_id(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_first_name(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<FieldParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let first_name = params.first_name.unwrap_or_default();

    let user = state.user_service.update_first_name(id, &first_name).await?;

    Ok(Json(user))
}

pub async fn update_last_name(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<FieldParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let last_name = params.last_name.unwrap_or_default();

    let user = state.user_service.update_last_name(id, &last_name).await?;

    Ok(Json(user))
}

pub async fn update_email(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<FieldParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let email = params.email.unwrap_or_default();

    let user = state.user_service.update_email(id, &email).await?;

    Ok(Json(user))
}

pub async fn update_birth_date(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<FieldParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let birth_date = required_param(params.birth_date, "birthDate")?;

    let user = state.user_service.update_birth_date(id, birth_date).await?;

    Ok(Json(user))
}

pub async fn update_address(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<FieldParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let address = required_param(params.address, "address")?;

    let user = state.user_service.update_address(id, &address).await?;

    Ok(Json(user))
}

pub async fn update_phone(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<FieldParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let phone = required_param(params.phone, "phone")?;

    let user = state.user_service.update_phone(id, &phone).await?;

    Ok(Json(user))
}
