use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Full HTTP surface
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_routes(state.clone()))
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
        .merge(protected_routes(state))
}

/// Authentication wraps every route; the admin gate wraps only its own method routes
fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{comments, issues, projects, users};

    let admin = || from_fn_with_state(state.clone(), require_admin);

    Router::new()
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/:id",
            get(projects::get)
                .put(projects::update)
                .merge(delete(projects::delete).route_layer(admin())),
        )
        .route("/issues", get(issues::list).post(issues::create))
        .route(
            "/issues/:id",
            get(issues::get).put(issues::update).delete(issues::delete),
        )
        .route("/comments", post(comments::create))
        .route("/comments/issue/:issue_id", get(comments::list_for_issue))
        .route("/comments/:id", put(comments::update).delete(comments::delete))
        .route("/users", get(users::list))
        .route("/users/profile", get(users::profile).put(users::update_profile))
        .route("/users/:id/role", put(users::set_role).route_layer(admin()))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "TrackMyBugs API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/v1/auth/register, /api/v1/auth/login (public)",
                "projects": "/api/v1/projects[/:id] (protected; delete requires admin)",
                "issues": "/api/v1/issues[/:id] (protected)",
                "comments": "/api/v1/comments, /api/v1/comments/issue/:issue_id, /api/v1/comments/:id (protected)",
                "users": "/api/v1/users, /api/v1/users/profile, /api/v1/users/:id/role (protected; role requires admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = state.clock.now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
