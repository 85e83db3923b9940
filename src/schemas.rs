use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::OpenApi;
use utoipa::ToSchema;

pub use common::{ApiResponse, ErrorResponse, Paginated};

use crate::config::AuthSettings;
use crate::handlers::{
    auth::{AccessToken, LoginRequest, RefreshRequest, SignupRequest, TokenPair},
    movies::{CreateMovieRequest, MovieResponse, PatchMovieRequest},
    reviews::{CreateReviewRequest, PatchReviewRequest, ReviewResponse},
    users::{ReplaceUserRequest, UpdateUserRequest, UserResponse},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Token signing settings
    pub auth: AuthSettings,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::movies::create_movie,
        crate::handlers::movies::get_movies,
        crate::handlers::movies::get_movie,
        crate::handlers::movies::update_movie,
        crate::handlers::movies::patch_movie,
        crate::handlers::movies::delete_movie,
        crate::handlers::reviews::create_review,
        crate::handlers::reviews::get_reviews,
        crate::handlers::reviews::search_reviews,
        crate::handlers::reviews::get_review,
        crate::handlers::reviews::update_review,
        crate::handlers::reviews::patch_review,
        crate::handlers::reviews::delete_review,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::patch_user,
        crate::handlers::users::delete_user,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CreateMovieRequest,
            PatchMovieRequest,
            MovieResponse,
            CreateReviewRequest,
            PatchReviewRequest,
            ReviewResponse,
            ReplaceUserRequest,
            UpdateUserRequest,
            UserResponse,
            SignupRequest,
            LoginRequest,
            RefreshRequest,
            TokenPair,
            AccessToken,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "movies", description = "Movie catalogue endpoints"),
        (name = "reviews", description = "Movie review endpoints"),
        (name = "users", description = "User account endpoints"),
        (name = "auth", description = "Signup, login and token endpoints"),
    ),
    info(
        title = "Movie Reviews API",
        description = "Movie review service: a catalogue of movies, user accounts and the reviews users write about movies",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

