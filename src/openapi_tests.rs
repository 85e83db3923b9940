#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{RefOr, schema::Schema};

    fn properties_of(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components are generated");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{} should be an object schema", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        let json = serde_json::to_string(&openapi).expect("schema serializes to JSON");
        assert!(json.contains("Movie Reviews API"));

        for path in [
            "/health",
            "/api/v1/movies",
            "/api/v1/movies/{movie_id}",
            "/api/v1/reviews",
            "/api/v1/reviews/search",
            "/api/v1/reviews/{review_id}",
            "/api/v1/users",
            "/api/v1/users/{user_id}",
            "/api/v1/signup",
            "/api/v1/login",
            "/api/v1/token/refresh",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_review_response_schema_structure() {
        let properties = properties_of("ReviewResponse");
        for field in [
            "id",
            "movie",
            "movie_title",
            "rating",
            "content",
            "user",
            "user_id",
            "created_date",
        ] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_user_response_has_no_password() {
        let properties = properties_of("UserResponse");
        assert!(properties.iter().any(|p| p == "username"));
        assert!(!properties.iter().any(|p| p.contains("password")));
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = properties_of("ErrorResponse");
        assert_eq!(properties.len(), 3);
        for field in ["error", "code", "success"] {
            assert!(properties.iter().any(|p| p == field));
        }
    }
}
