use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;
use crate::utils::Config;

pub fn create_router(state: AppState, config: &Config) -> Router {
    let cors_layer = create_cors_layer(config);

    Router::new()
        .route("/health", get(health_check))
        // Auth (public)
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        // Users
        .route(
            "/users/me",
            get(handlers::users::get_current_user).put(handlers::users::update_profile),
        )
        .route("/users/search", get(handlers::users::search_users))
        .route("/users/{id}", get(handlers::users::get_user_by_id))
        // Connections
        .route("/connections", get(handlers::connections::list_connections))
        .route("/connections/pending", get(handlers::connections::list_pending))
        .route(
            "/connections/send-request/{addressee_id}",
            post(handlers::connections::send_request),
        )
        .route(
            "/connections/accept-request/{requester_id}",
            post(handlers::connections::accept_request),
        )
        .route(
            "/connections/decline-request/{requester_id}",
            post(handlers::connections::decline_request),
        )
        .route(
            "/connections/remove-friend/{friend_id}",
            delete(handlers::connections::remove_friend),
        )
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn create_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(false);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if !trimmed.is_empty() {
                trimmed.parse().ok()
            } else {
                None
            }
        })
        .collect();

    if origins.is_empty() {
        // Permissive when unset or unparseable
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::AuthGate;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;
    use uuid::Uuid;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            token_ttl: chrono::Duration::hours(24),
            bcrypt_cost: 4,
            allowed_origins: None,
        }
    }

    fn test_app() -> Router {
        let config = test_config();
        let state = AppState::new(Arc::new(MemoryStore::new()), AuthGate::from_config(&config));
        create_router(state, &config)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// Registers a user and returns (token, id).
    async fn register(app: &Router, username: &str, display_name: &str) -> (String, String) {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": username,
                "display_name": display_name,
                "email": format!("{}@example.com", username),
                "password": "password123",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_and_login_return_owner_view() {
        let app = test_app();
        let (token, id) = register(&app, "john_doe", "John Doe").await;
        assert!(!token.is_empty());

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "john_doe@example.com", "password": "password123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], id);
        assert_eq!(body["user"]["email"], "john_doe@example.com");
        assert!(body["user"].get("hashed_password").is_none());

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "john_doe@example.com", "password": "wrong-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = test_app();
        register(&app, "john_doe", "John Doe").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "john_doe",
                "display_name": "Another John",
                "email": "another@example.com",
                "password": "password123",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "username_taken");
    }

    #[tokio::test]
    async fn test_malformed_body_is_structured_validation_error() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "username": "john_doe" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_protected_routes_require_bearer_token() {
        let app = test_app();

        let (status, body) = send(&app, Method::GET, "/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, _) = send(&app, Method::GET, "/connections", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/users/me")
            .header(header::AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Auth is checked before the path id is parsed.
        let (status, _) = send(
            &app,
            Method::POST,
            "/connections/send-request/not-a-uuid",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_views_and_update() {
        let app = test_app();
        let (john_token, john_id) = register(&app, "john_doe", "John Doe").await;
        let (jane_token, _) = register(&app, "jane_smith", "Jane Smith").await;

        let (status, me) = send(&app, Method::GET, "/users/me", Some(&john_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "john_doe@example.com");

        let (status, public) = send(
            &app,
            Method::GET,
            &format!("/users/{}", john_id),
            Some(&jane_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public["username"], "john_doe");
        assert!(public.get("email").is_none());
        assert!(public.get("hashed_password").is_none());

        let (status, body) = send(&app, Method::GET, "/users/nope", Some(&jane_token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_id");

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/users/{}", Uuid::new_v4()),
            Some(&jane_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "user_not_found");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/users/me",
            Some(&john_token),
            Some(json!({ "display_name": "Johnny" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["display_name"], "Johnny");
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let app = test_app();
        let (token, _) = register(&app, "john_doe", "John Doe").await;
        register(&app, "jane_smith", "Jane Smith").await;

        let (status, body) = send(&app, Method::GET, "/users/search?q=john&limit=10", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body.as_array().unwrap().iter().map(|u| u["username"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["john_doe"]);
        assert!(body[0].get("email").is_none());

        let (_, body) = send(&app, Method::GET, "/users/search?q=j", Some(&token), None).await;
        let names: Vec<&str> = body.as_array().unwrap().iter().map(|u| u["username"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["john_doe", "jane_smith"]);

        let (status, body) = send(&app, Method::GET, "/users/search?q=", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let (status, _) = send(&app, Method::GET, "/users/search", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/users/search?q=j&limit=lots", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/users/search?q=j&limit=1000", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_connection_lifecycle() {
        let app = test_app();
        let (alice_token, alice_id) = register(&app, "alice", "Alice").await;
        let (bob_token, bob_id) = register(&app, "bobby", "Bob").await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/connections/send-request/{}", bob_id),
            Some(&alice_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["requester_id"], alice_id);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/connections/send-request/{}", alice_id),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "connection_exists");

        let (status, pending) = send(&app, Method::GET, "/connections/pending", Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pending.as_array().unwrap().len(), 1);
        assert_eq!(pending[0]["user"]["id"], alice_id);
        assert!(pending[0]["user"].get("email").is_none());

        // Alice is the requester and cannot accept her own request.
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/connections/accept-request/{}", bob_id),
            Some(&alice_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "request_not_found");

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/connections/accept-request/{}", alice_id),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, friends) = send(&app, Method::GET, "/connections", Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(friends[0]["user"]["id"], bob_id);
        assert_eq!(friends[0]["connection"]["status"], "accepted");

        let remove_uri = format!("/connections/remove-friend/{}", alice_id);
        let (status, _) = send(&app, Method::DELETE, &remove_uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::OK);

        for _ in 0..2 {
            let (status, body) = send(&app, Method::DELETE, &remove_uri, Some(&bob_token), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "friendship_not_found");
        }
    }

    #[tokio::test]
    async fn test_decline_and_path_validation() {
        let app = test_app();
        let (alice_token, alice_id) = register(&app, "alice", "Alice").await;
        let (bob_token, bob_id) = register(&app, "bobby", "Bob").await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/connections/send-request/{}", alice_id),
            Some(&alice_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let (status, body) = send(
            &app,
            Method::POST,
            "/connections/decline-request/12345",
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_id");

        send(
            &app,
            Method::POST,
            &format!("/connections/send-request/{}", bob_id),
            Some(&alice_token),
            None,
        )
        .await;
        let decline_uri = format!("/connections/decline-request/{}", alice_id);
        let (status, _) = send(&app, Method::POST, &decline_uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::POST, &decline_uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "request_not_found");
    }
}
