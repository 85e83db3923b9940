use crate::handlers::{
    auth::{login, refresh, signup},
    health::health_check,
    movies::{create_movie, delete_movie, get_movie, get_movies, patch_movie, update_movie},
    reviews::{
        create_review, delete_review, get_review, get_reviews, patch_review, search_reviews,
        update_review,
    },
    users::{delete_user, get_user, get_users, patch_user, update_user},
};
use crate::schemas::{ApiDoc, AppState};
#[cfg(not(test))]
use axum_prometheus::PrometheusMetricLayer;
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Movie routes
        .route("/api/v1/movies", get(get_movies).post(create_movie))
        .route(
            "/api/v1/movies/:movie_id",
            get(get_movie)
                .put(update_movie)
                .patch(patch_movie)
                .delete(delete_movie),
        )
        // Review routes
        .route("/api/v1/reviews", get(get_reviews).post(create_review))
        .route("/api/v1/reviews/search", get(search_reviews))
        .route(
            "/api/v1/reviews/:review_id",
            get(get_review)
                .put(update_review)
                .patch(patch_review)
                .delete(delete_review),
        )
        // Account routes
        .route("/api/v1/signup", post(signup))
        .route("/api/v1/login", post(login))
        .route("/api/v1/token/refresh", post(refresh))
        .route("/api/v1/users", get(get_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The metrics recorder is process global, so tests run without it
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
