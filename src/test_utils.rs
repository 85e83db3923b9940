#[cfg(test)]
pub mod test_utils {
    use crate::auth::{AuthUser, TokenKind, issue_token};
    use crate::config::AuthSettings;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::services::users::{self, NewUser};
    use axum::Router;
    use axum::http::HeaderValue;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    /// Password every test account is created with
    pub const TEST_PASSWORD: &str = "correct horse battery";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    pub fn test_auth_settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".to_string(),
            ..AuthSettings::default()
        }
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        AppState {
            db: setup_test_db().await,
            auth: test_auth_settings(),
        }
    }

    /// Register an account directly through the service layer.
    pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> AuthUser {
        let model = users::signup(
            db,
            NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: TEST_PASSWORD.to_string(),
                first_name: String::new(),
                last_name: String::new(),
            },
        )
        .await
        .expect("Failed to create test user");

        AuthUser::from(&model)
    }

    /// `Authorization` header value carrying a fresh access token for `user`.
    pub fn bearer_for(state: &AppState, user: &AuthUser) -> HeaderValue {
        let token = issue_token(&state.auth, user.id, &user.username, TokenKind::Access)
            .expect("Failed to sign test token");
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("Token is a valid header value")
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The filter is taken from `RUST_LOG`, defaulting to `warn`. Only the
    /// first call in a test binary installs the subscriber.
    fn init_test_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .try_init();
    }

    /// Create axum app for testing, returning the state it runs on as well
    /// so tests can seed data and mint tokens.
    pub async fn setup_test_app() -> (Router, AppState) {
        init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state.clone());
        (router, state)
    }
}
