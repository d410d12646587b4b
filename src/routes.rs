//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod indexing;
mod migration;

use crate::auth::{auth_middleware, require_manage_index, require_run_migrations};
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    app_routes(state).layer(middleware)
}

/// Routes without the transport middleware stack
pub fn app_routes(state: SharedState) -> Router {
    // Every route added before `route_layer` requires the owner permission
    let indexing = Router::new()
        .route("/create", get(indexing::create_form).post(indexing::create))
        .route("/update", post(indexing::update))
        .route("/rebuild", post(indexing::rebuild))
        .route("/delete", post(indexing::delete))
        .route_layer(middleware::from_fn(require_manage_index))
        .route("/index", get(indexing::index))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let migrations = Router::new()
        .route("/statements", post(migration::statements))
        .route("/apply", post(migration::apply))
        .route_layer(middleware::from_fn(require_run_migrations))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/admin/indexing", indexing)
        .nest("/admin/migrations", migrations)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{create_token, Role};
    use crate::indexing::{
        DefaultIndexingService, IndexAdmin, IndexManager, IndexProvider, MemoryIndexProvider,
    };
    use crate::migration::{MigrationRunner, StatementBuilder, TablePrefix};
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    fn test_app(provider: Arc<MemoryIndexProvider>) -> Router {
        let manager = IndexManager::new(Some(provider as Arc<dyn IndexProvider>));
        let service = Arc::new(DefaultIndexingService::new(manager.clone()));
        let builder = StatementBuilder::for_provider("SqlServer", TablePrefix::none(), None);
        let state = Arc::new(AppState::new(
            IndexAdmin::new(manager, service),
            builder.map(|b| MigrationRunner::new(b, None)),
            SECRET.to_string(),
        ));
        app_routes(state)
    }

    fn bearer(user: Uuid, role: Role) -> String {
        format!("Bearer {}", create_token(SECRET, user, "tester", role).unwrap())
    }

    fn form_post(uri: &str, auth: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, auth: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app(Arc::new(MemoryIndexProvider::new()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_listing_requires_token() {
        let app = test_app(Arc::new(MemoryIndexProvider::new()));
        let response = app
            .oneshot(Request::builder().uri(indexing::LIST_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_mutate() {
        let provider = Arc::new(MemoryIndexProvider::new());
        provider.create_index("Search").await.unwrap();
        let app = test_app(provider.clone());
        let user = Uuid::new_v4();
        let auth = bearer(user, Role::Editor);

        for action in ["create", "update", "rebuild", "delete"] {
            let uri = format!("/admin/indexing/{}", action);
            let response = app
                .clone()
                .oneshot(form_post(&uri, &auth, "id=Other"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", action);

            let response = app
                .clone()
                .oneshot(form_post(&uri, &auth, "id=Search"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", action);
        }
        let response = app
            .clone()
            .oneshot(get_request("/admin/indexing/create", &auth))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert_eq!(provider.list().await, vec!["Search"]);
        let response = app.oneshot(get_request(indexing::LIST_PATH, &auth)).await.unwrap();
        let listing = json_body(response).await;
        assert_eq!(listing["data"]["indexEntries"][0]["lastUpdateUtc"], serde_json::Value::Null);
        assert_eq!(listing["data"]["notifications"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_run_migrations() {
        let app = test_app(Arc::new(MemoryIndexProvider::new()));
        let body = serde_json::json!({
            "commands": [
                {
                    "kind": "addIndex",
                    "tableName": "Users",
                    "indexName": "IDX",
                    "columnNames": ["Email"]
                }
            ]
        });

        for path in ["/admin/migrations/statements", "/admin/migrations/apply"] {
            let request = Request::builder()
                .method("POST")
                .uri(path)
                .header(header::AUTHORIZATION, bearer(Uuid::new_v4(), Role::Editor))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();

            let response = app.clone().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", path);
            let body = json_body(response).await;
            assert_eq!(body["message"], "Not allowed to run data migrations.");
        }
    }

    #[tokio::test]
    async fn test_viewer_can_list() {
        let provider = Arc::new(MemoryIndexProvider::new());
        provider.create_index("Search").await.unwrap();
        let app = test_app(provider);

        let response = app
            .oneshot(get_request(indexing::LIST_PATH, &bearer(Uuid::new_v4(), Role::Viewer)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["indexProvider"], "memory");
        assert_eq!(body["data"]["indexEntries"][0]["indexName"], "Search");
    }

    #[tokio::test]
    async fn test_owner_create_redirects_and_notifies() {
        let provider = Arc::new(MemoryIndexProvider::new());
        let app = test_app(provider.clone());
        let auth = bearer(Uuid::new_v4(), Role::Owner);

        let response = app
            .clone()
            .oneshot(form_post("/admin/indexing/create", &auth, "id=Search"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], indexing::LIST_PATH);
        assert!(provider.exists("Search").await);

        let response = app.oneshot(get_request(indexing::LIST_PATH, &auth)).await.unwrap();
        let listing = json_body(response).await;
        assert_eq!(
            listing["data"]["notifications"][0]["message"],
            "Index named Search created successfully"
        );
    }

    #[tokio::test]
    async fn test_invalid_create_rerenders_form() {
        let app = test_app(Arc::new(MemoryIndexProvider::new()));
        let auth = bearer(Uuid::new_v4(), Role::Owner);

        let response = app
            .oneshot(form_post("/admin/indexing/create", &auth, "id=bad+name"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["id"], "bad name");
        assert_eq!(body["notifications"][0]["message"], "Invalid index name.");
    }

    #[tokio::test]
    async fn test_invalid_update_still_redirects() {
        let app = test_app(Arc::new(MemoryIndexProvider::new()));
        let response = app
            .oneshot(form_post(
                "/admin/indexing/update",
                &bearer(Uuid::new_v4(), Role::Owner),
                "id=",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_migration_statements_for_owner() {
        let app = test_app(Arc::new(MemoryIndexProvider::new()));
        let body = serde_json::json!({
            "commands": [
                {
                    "kind": "addIndex",
                    "tableName": "Users",
                    "indexName": "IDX_Email",
                    "columnNames": ["Email"]
                }
            ]
        });
        let request = Request::builder()
            .method("POST")
            .uri("/admin/migrations/statements")
            .header(header::AUTHORIZATION, bearer(Uuid::new_v4(), Role::Owner))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["executed"], false);
        assert_eq!(
            body["data"]["statements"][0],
            "create index \"IDX_Email\" on \"Users\" (Email) "
        );
    }

    #[tokio::test]
    async fn test_migration_rejects_injected_column() {
        let app = test_app(Arc::new(MemoryIndexProvider::new()));
        let body = serde_json::json!({
            "commands": [
                {
                    "kind": "addIndex",
                    "tableName": "Users",
                    "indexName": "IDX",
                    "columnNames": ["a); drop table x"]
                }
            ]
        });
        let request = Request::builder()
            .method("POST")
            .uri("/admin/migrations/statements")
            .header(header::AUTHORIZATION, bearer(Uuid::new_v4(), Role::Owner))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
