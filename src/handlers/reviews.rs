use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use axum_valid::{Valid, ValidRejection};
use chrono::{DateTime, Utc};
use common::PageRequest;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, Paginated};
use crate::services::reviews::{self, NewReview, ReviewChanges, ReviewFilter, ReviewRecord};

/// Request body for creating or replacing a review.
///
/// The author is always the authenticated caller; `user` and `created_date`
/// in the payload are ignored.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateReviewRequest {
    /// ID of the reviewed movie
    pub movie: i32,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Review text
    pub content: String,
}

/// Request body for partially updating a review
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PatchReviewRequest {
    pub movie: Option<i32>,
    pub rating: Option<i32>,
    pub content: Option<String>,
}

/// Review response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    /// ID of the reviewed movie
    pub movie: i32,
    pub movie_title: String,
    pub rating: i32,
    pub content: String,
    /// Username of the author
    pub user: String,
    pub user_id: i32,
    pub created_date: DateTime<Utc>,
}

impl From<ReviewRecord> for ReviewResponse {
    fn from(record: ReviewRecord) -> Self {
        Self {
            id: record.id,
            movie: record.movie_id,
            movie_title: record.movie_title,
            rating: record.rating,
            content: record.content,
            user: record.username,
            user_id: record.user_id,
            created_date: record.created_date,
        }
    }
}

/// Query parameters for listing and searching reviews
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ReviewQuery {
    /// Case-insensitive substring of the movie title
    pub movie_title: Option<String>,
    /// Exact rating (1-5)
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    /// Page number (default: 1)
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    /// Page size (default: 5, larger values are clamped to 10)
    #[validate(range(min = 1))]
    pub page_size: Option<u64>,
}

impl ReviewQuery {
    fn into_parts(self) -> (ReviewFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.page_size);
        let filter = ReviewFilter {
            movie_title: self.movie_title,
            rating: self.rating,
        };
        (filter, page)
    }
}

async fn list(
    state: &AppState,
    query: ReviewQuery,
) -> Result<Json<ApiResponse<Paginated<ReviewResponse>>>, AppError> {
    let (filter, page) = query.into_parts();
    let page = reviews::list_reviews(&state.db, &filter, page).await?;
    info!(
        "Successfully retrieved {} of {} reviews",
        page.results.len(),
        page.count
    );

    let response = ApiResponse::ok(page.map(ReviewResponse::from), "Reviews retrieved successfully");
    Ok(Json(response))
}

/// Create a new review as the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid request or rating", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_review(
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), AppError> {
    trace!("Entering create_review function");
    let Json(request) = payload?;

    debug!(
        "Creating review for movie {} with rating {}",
        request.movie, request.rating
    );
    let new_review = NewReview {
        movie_id: request.movie,
        rating: request.rating,
        content: request.content,
    };
    let record = reviews::create_review(&state.db, &principal, new_review).await?;

    let response = ApiResponse::ok(ReviewResponse::from(record), "Review created successfully");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all reviews, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    tag = "reviews",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ApiResponse<Paginated<ReviewResponse>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 404, description = "Page out of range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, query))]
pub async fn get_reviews(
    State(state): State<AppState>,
    query: Result<Valid<Query<ReviewQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<ApiResponse<Paginated<ReviewResponse>>>, AppError> {
    let Valid(Query(query)) = query?;
    trace!("Entering get_reviews function");
    list(&state, query).await
}

/// Search reviews by movie title and rating
#[utoipa::path(
    get,
    path = "/api/v1/reviews/search",
    tag = "reviews",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Matching reviews retrieved successfully", body = ApiResponse<Paginated<ReviewResponse>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 404, description = "Page out of range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, query))]
pub async fn search_reviews(
    State(state): State<AppState>,
    query: Result<Valid<Query<ReviewQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<ApiResponse<Paginated<ReviewResponse>>>, AppError> {
    let Valid(Query(query)) = query?;
    trace!("Entering search_reviews function");
    debug!(
        "Searching reviews - movie_title: {:?}, rating: {:?}",
        query.movie_title, query.rating
    );
    list(&state, query).await
}

/// Get a specific review by ID
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review retrieved successfully", body = ApiResponse<ReviewResponse>),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_review(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReviewResponse>>, AppError> {
    let Path(review_id) = path?;
    trace!("Entering get_review function for review_id: {}", review_id);

    let record = reviews::get_review(&state.db, review_id).await?;
    let response = ApiResponse::ok(ReviewResponse::from(record), "Review retrieved successfully");
    Ok(Json(response))
}

/// Replace a review owned by the authenticated user
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review updated successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid request or rating", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the author of the review", body = ErrorResponse),
        (status = 404, description = "Review or movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_review(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReviewResponse>>, AppError> {
    let Path(review_id) = path?;
    trace!("Entering update_review function for review_id: {}", review_id);
    let Json(request) = payload?;

    let changes = ReviewChanges {
        movie_id: Some(request.movie),
        rating: Some(request.rating),
        content: Some(request.content),
    };
    let record = reviews::update_review(&state.db, &principal, review_id, changes).await?;

    let response = ApiResponse::ok(ReviewResponse::from(record), "Review updated successfully");
    Ok(Json(response))
}

/// Partially update a review owned by the authenticated user
#[utoipa::path(
    patch,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    request_body = PatchReviewRequest,
    responses(
        (status = 200, description = "Review updated successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid request or rating", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the author of the review", body = ErrorResponse),
        (status = 404, description = "Review or movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_review(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
    payload: Result<Json<PatchReviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReviewResponse>>, AppError> {
    let Path(review_id) = path?;
    trace!("Entering patch_review function for review_id: {}", review_id);
    let Json(request) = payload?;

    let changes = ReviewChanges {
        movie_id: request.movie,
        rating: request.rating,
        content: request.content,
    };
    let record = reviews::update_review(&state.db, &principal, review_id, changes).await?;

    let response = ApiResponse::ok(ReviewResponse::from(record), "Review updated successfully");
    Ok(Json(response))
}

/// Delete a review owned by the authenticated user
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 204, description = "Review deleted successfully"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the author of the review", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_review(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    principal: AuthUser,
) -> Result<StatusCode, AppError> {
    let Path(review_id) = path?;
    trace!("Entering delete_review function for review_id: {}", review_id);

    reviews::delete_review(&state.db, &principal, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
