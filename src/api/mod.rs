//! HTTP API Handlers and Routes
//!
//! The REST layer of the accounts server, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Users (`/api/users`)
//! - `GET /api/users/all` - List all users
//! - `GET /api/users/one/{user_id}` - Get a user by id
//! - `GET /api/users/current` - Get the authenticated user
//! - `POST /api/users/register` - Register (multipart, with profile image)
//! - `POST /api/users/login` - Login and receive a JWT
//! - `PATCH /api/users/update` - Update own profile (multipart)
//! - `DELETE /api/users/delete` - Delete own account
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Authentication
//!
//! Protected endpoints require a valid JWT token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`. When the
//! `swagger-ui` feature is enabled, interactive documentation is available at
//! `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{
    AuthResponse, Gender, LoginRequest, MessageResponse, UserProfile, UserResponse, UsersResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Path the OpenAPI document is served at.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI description of the public HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::current_user,
        handlers::users::register,
        handlers::users::login,
        handlers::users::update_user,
        handlers::users::delete_user,
    ),
    components(schemas(
        AuthResponse,
        Gender,
        LoginRequest,
        MessageResponse,
        UserProfile,
        UserResponse,
        UsersResponse,
        handlers::users::RegisterForm,
        handlers::users::UpdateForm,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Account registration, login and profile management"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
