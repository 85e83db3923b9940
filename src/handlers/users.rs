use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use axum_valid::{Valid, ValidRejection};
use model::entities::user;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use super::ListQuery;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, Paginated};
use crate::services::users::{self, UserChanges};

/// Request body for replacing an account
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct ReplaceUserRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// New password, left unchanged when omitted
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Request body for partially updating an account
#[derive(Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User response model. The password digest is never part of it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
        }
    }
}

impl From<ReplaceUserRequest> for UserChanges {
    fn from(request: ReplaceUserRequest) -> Self {
        Self {
            username: Some(request.username),
            email: Some(request.email),
            password: request.password,
            first_name: Some(request.first_name),
            last_name: Some(request.last_name),
        }
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
        }
    }
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(ListQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Paginated<UserResponse>>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Page out of range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, query))]
pub async fn get_users(
    State(state): State<AppState>,
    principal: AuthUser,
    query: Result<Valid<Query<ListQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<ApiResponse<Paginated<UserResponse>>>, AppError> {
    let Valid(Query(query)) = query?;
    trace!("Entering get_users function");

    let page = users::list_users(&state.db, query.page_request()).await?;
    info!("Successfully retrieved {} users", page.results.len());

    let response = ApiResponse::ok(page.map(UserResponse::from), "Users retrieved successfully");
    Ok(Json(response))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let Path(user_id) = path?;
    trace!("Entering get_user function for user_id: {}", user_id);

    let model = users::get_user(&state.db, user_id).await?;
    let response = ApiResponse::ok(UserResponse::from(model), "User retrieved successfully");
    Ok(Json(response))
}

/// Replace the authenticated user's own account
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = ReplaceUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, payload))]
pub async fn update_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<ReplaceUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let Path(user_id) = path?;
    trace!("Entering update_user function for user_id: {}", user_id);
    let Json(request) = payload?;
    request.validate()?;

    let model = users::update_user(&state.db, &principal, user_id, request.into()).await?;
    let response = ApiResponse::ok(UserResponse::from(model), "User updated successfully");
    Ok(Json(response))
}

/// Partially update the authenticated user's own account
#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, payload))]
pub async fn patch_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let Path(user_id) = path?;
    trace!("Entering patch_user function for user_id: {}", user_id);
    let Json(request) = payload?;
    request.validate()?;

    let model = users::update_user(&state.db, &principal, user_id, request.into()).await?;
    let response = ApiResponse::ok(UserResponse::from(model), "User updated successfully");
    Ok(Json(response))
}

/// Delete the authenticated user's own account and all of its reviews
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
) -> Result<StatusCode, AppError> {
    let Path(user_id) = path?;
    trace!("Entering delete_user function for user_id: {}", user_id);
    debug!("User {} requested deletion of account {}", principal.username, user_id);

    users::delete_user(&state.db, &principal, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
