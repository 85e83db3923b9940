use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use super::users::UserResponse;
use crate::auth::{AuthError, TokenKind, decode_token, issue_token};
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::services::users::{self, NewUser};

/// Request body for registering an account
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct SignupRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Plain password, at least 8 characters
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct RefreshRequest {
    /// A refresh token obtained from login
    pub refresh: String,
}

/// Token pair issued on login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// Short-lived token for the `Authorization: Bearer` header
    pub access: String,
    /// Long-lived token accepted only by the refresh endpoint
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    trace!("Entering signup function");
    let Json(request) = payload?;
    request.validate()?;

    debug!("Signing up user with username: {}", request.username);
    let new_user = NewUser {
        username: request.username,
        email: request.email,
        password: request.password,
        first_name: request.first_name,
        last_name: request.last_name,
    };
    let model = users::signup(&state.db, new_user).await?;

    let response = ApiResponse::ok(UserResponse::from(model), "User created successfully");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange a username and password for a token pair
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenPair>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    trace!("Entering login function");
    let Json(request) = payload?;

    let account = users::authenticate(&state.db, &request.username, &request.password).await?;
    let tokens = TokenPair {
        access: issue_token(&state.auth, account.id, &account.username, TokenKind::Access)?,
        refresh: issue_token(&state.auth, account.id, &account.username, TokenKind::Refresh)?,
    };

    info!("User {} logged in", account.username);
    Ok(Json(ApiResponse::ok(tokens, "Login successful")))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/v1/token/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<AccessToken>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AccessToken>>, AppError> {
    trace!("Entering refresh function");
    let Json(request) = payload?;

    let claims = decode_token(&state.auth, &request.refresh, TokenKind::Refresh)?;

    // The account may have been deleted since login
    let account = users::get_user(&state.db, claims.sub)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::from(AuthError::UnknownUser),
            other => other,
        })?;

    let access = issue_token(&state.auth, account.id, &account.username, TokenKind::Access)?;
    debug!("Issued a fresh access token for user {}", account.username);
    Ok(Json(ApiResponse::ok(AccessToken { access }, "Token refreshed")))
}
