use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::crud;
use crate::database;
use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::todo::{self, TodoResource, TodoStore};

/// Shared, read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: SqlitePool,
    pub auth: Arc<AuthService>,
    pub todos: Arc<TodoResource>,
}

impl AppState {
    /// Connect to the configured database, apply the schema and build services
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let pool = database::connect(&config.database).await?;
        Self::with_pool(config, pool)
    }

    pub fn with_pool(config: AppConfig, pool: SqlitePool) -> anyhow::Result<Self> {
        let auth = AuthService::new(pool.clone(), &config.security)?;
        let todos = TodoResource::new(TodoStore::new(pool.clone()), todo::PREFIX);

        Ok(Self {
            config: Arc::new(config),
            pool,
            auth: Arc::new(auth),
            todos: Arc::new(todos),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let protected_routes = Router::new()
        .route("/auth/whoami", get(protected::auth::whoami_get))
        .merge(crud::router(state.todos.clone()))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Bearer token required
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        if config.is_production() && config.security.cors_origins.iter().any(|o| o == "*") {
            warn!("Permissive CORS is enabled in production");
        }
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/login", post(auth::login_post))
}

/// `*` (or no origins at all) is permissive; otherwise only the listed origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        info!("CORS enabled for any origin");
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    info!("CORS enabled for {} origin(s)", allowed.len());

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_with_auth(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_and_bad_tokens() {
        let ctx = TestContext::new().await;
        let unauthorized = serde_json::json!({ "statusCode": 401, "message": "Unauthorized" });

        for uri in ["/todo", "/todo/abc", "/auth/whoami"] {
            let (status, body) = send(app(ctx.state.clone()), get_with_auth(uri, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
            assert_eq!(body, unauthorized);

            let (status, _) = send(
                app(ctx.state.clone()),
                get_with_auth(uri, Some("Bearer not-a-token")),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn whoami_returns_the_resolved_identity() {
        let ctx = TestContext::new().await;
        let (user, token) = ctx.user_with_token("alice").await;

        let (status, body) = send(
            app(ctx.state.clone()),
            get_with_auth("/auth/whoami", Some(&format!("Bearer {}", token))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({ "id": user.id, "username": "alice", "role": "USER" })
        );
    }

    #[tokio::test]
    async fn health_and_root_are_public() {
        let ctx = TestContext::new().await;

        let (status, body) = send(app(ctx.state.clone()), get_with_auth("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");

        let (status, body) = send(app(ctx.state.clone()), get_with_auth("/", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn health_is_unavailable_without_a_database() {
        let ctx = TestContext::new().await;
        ctx.state.pool.close().await;

        let (status, body) = send(app(ctx.state.clone()), get_with_auth("/health", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["statusCode"], 503);
        assert_eq!(body["message"], "Database unavailable");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let ctx = TestContext::new().await;
        let request = Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ nope"))
            .unwrap();
        let (status, body) = send(app(ctx.state.clone()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["error"], "Bad Request");
    }

    #[test]
    fn cors_layer_accepts_lists_and_wildcards() {
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&[]);
        let _ = cors_layer(&["http://localhost:5173".to_string(), "bad\norigin".to_string()]);
    }
}
