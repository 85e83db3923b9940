use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use axum_valid::{Valid, ValidRejection};
use chrono::NaiveDate;
use model::entities::movie;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use super::ListQuery;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, Paginated};
use crate::services::movies::{self, MovieChanges, NewMovie};

/// Request body for creating or replacing a movie
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateMovieRequest {
    /// Movie title
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    /// Plot summary
    pub description: String,
    /// Release date (YYYY-MM-DD)
    pub release_date: NaiveDate,
}

/// Request body for partially updating a movie
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct PatchMovieRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Movie response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
}

impl From<movie::Model> for MovieResponse {
    fn from(model: movie::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            release_date: model.release_date,
        }
    }
}

impl From<CreateMovieRequest> for NewMovie {
    fn from(request: CreateMovieRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            release_date: request.release_date,
        }
    }
}

impl From<PatchMovieRequest> for MovieChanges {
    fn from(request: PatchMovieRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            release_date: request.release_date,
        }
    }
}

/// Create a new movie
#[utoipa::path(
    post,
    path = "/api/v1/movies",
    tag = "movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created successfully", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_movie(
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<MovieResponse>>), AppError> {
    trace!("Entering create_movie function");
    let Json(request) = payload?;
    request.validate()?;

    debug!("Creating movie with title: {}", request.title);
    let model = movies::create_movie(&state.db, request.into()).await?;

    let response = ApiResponse::ok(MovieResponse::from(model), "Movie created successfully");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all movies
#[utoipa::path(
    get,
    path = "/api/v1/movies",
    tag = "movies",
    params(ListQuery),
    responses(
        (status = 200, description = "Movies retrieved successfully", body = ApiResponse<Paginated<MovieResponse>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 404, description = "Page out of range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, query))]
pub async fn get_movies(
    State(state): State<AppState>,
    query: Result<Valid<Query<ListQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<ApiResponse<Paginated<MovieResponse>>>, AppError> {
    let Valid(Query(query)) = query?;
    trace!("Entering get_movies function");

    let page = movies::list_movies(&state.db, query.page_request()).await?;
    info!("Successfully retrieved {} movies", page.results.len());

    let response = ApiResponse::ok(page.map(MovieResponse::from), "Movies retrieved successfully");
    Ok(Json(response))
}

/// Get a specific movie by ID
#[utoipa::path(
    get,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Movie retrieved successfully", body = ApiResponse<MovieResponse>),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_movie(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MovieResponse>>, AppError> {
    let Path(movie_id) = path?;
    trace!("Entering get_movie function for movie_id: {}", movie_id);

    let model = movies::get_movie(&state.db, movie_id).await?;
    let response = ApiResponse::ok(MovieResponse::from(model), "Movie retrieved successfully");
    Ok(Json(response))
}

/// Replace a movie
#[utoipa::path(
    put,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    request_body = CreateMovieRequest,
    responses(
        (status = 200, description = "Movie updated successfully", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_movie(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MovieResponse>>, AppError> {
    let Path(movie_id) = path?;
    trace!("Entering update_movie function for movie_id: {}", movie_id);
    let Json(request) = payload?;
    request.validate()?;

    let changes = MovieChanges {
        title: Some(request.title),
        description: Some(request.description),
        release_date: Some(request.release_date),
    };
    let model = movies::update_movie(&state.db, movie_id, changes).await?;

    let response = ApiResponse::ok(MovieResponse::from(model), "Movie updated successfully");
    Ok(Json(response))
}

/// Partially update a movie
#[utoipa::path(
    patch,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    request_body = PatchMovieRequest,
    responses(
        (status = 200, description = "Movie updated successfully", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_movie(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<PatchMovieRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MovieResponse>>, AppError> {
    let Path(movie_id) = path?;
    trace!("Entering patch_movie function for movie_id: {}", movie_id);
    let Json(request) = payload?;
    request.validate()?;

    let model = movies::update_movie(&state.db, movie_id, request.into()).await?;
    let response = ApiResponse::ok(MovieResponse::from(model), "Movie updated successfully");
    Ok(Json(response))
}

/// Delete a movie and all of its reviews
#[utoipa::path(
    delete,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    responses(
        (status = 204, description = "Movie deleted successfully"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_movie(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
) -> Result<StatusCode, AppError> {
    let Path(movie_id) = path?;
    trace!("Entering delete_movie function for movie_id: {}", movie_id);

    let removed = movies::delete_movie(&state.db, movie_id).await?;
    info!(
        "Movie {} deleted by {} ({} reviews removed)",
        movie_id, principal.username, removed
    );
    Ok(StatusCode::NO_CONTENT)
}
