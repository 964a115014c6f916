use crate::api::handlers::{health, users};
use crate::auth::middleware::auth_middleware;
use crate::types::MessageResponse;
use crate::utils::toml_config::StorageBackend;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Routes mounted under `/api/users`.
pub fn create_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route("/all", get(users::list_users))
        .route("/one/{user_id}", get(users::get_user))
        .route("/register", post(users::register))
        .route("/login", post(users::login));

    let protected_routes = Router::new()
        // Protected routes (auth required)
        .route("/current", get(users::current_user))
        .route("/update", patch(users::update_user))
        .route("/delete", delete(users::delete_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public_routes.merge(protected_routes)
}

/// The complete application: API, docs, uploads, fallback and middleware stack.
pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/users", create_router(state.clone()))
        .merge(docs_router());

    if let StorageBackend::Local {
        root,
        serve_at: Some(mount),
        ..
    } = &config.storage.backend
    {
        app = app.nest_service(mount, ServeDir::new(root));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    app.fallback(not_found)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    use utoipa_swagger_ui::SwaggerUi;

    SwaggerUi::new("/swagger-ui")
        .url(crate::api::OPENAPI_PATH, crate::api::ApiDoc::openapi())
        .into()
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    Router::new().route(
        crate::api::OPENAPI_PATH,
        get(|| async { Json(crate::api::ApiDoc::openapi()) }),
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::new("Could not find this route.")),
    )
}
