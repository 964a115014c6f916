//! Authentication and Authorization
//!
//! This module turns passwords into one-way hashes, hands out bearer tokens,
//! and gates protected routes on those tokens.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id hashing and constant-time verification
//! - [`auth::jwt`](crate::auth::jwt) - HS256 token issuance and verification
//! - [`auth::middleware`](crate::auth::middleware) - Axum gate and extractor for protected routes
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id with a configurable work factor; PHC strings embed
//!   the salt and parameters
//! - **Tokens**: stateless HS256 JWTs carrying only `sub`, `iat` and `exp` (default 30 days)
//! - **Uniform rejection**: every token failure becomes the same 401 "Not authorized"
//!
//! # Usage
//!
//! ## Token Generation
//!
//! ```ignore
//! use accounts::auth::jwt::TokenService;
//!
//! let tokens = TokenService::new(&secret, chrono::Duration::days(30));
//! let token = tokens.issue_default(&user_id)?;
//! assert_eq!(tokens.verify(&token)?, user_id);
//! ```
//!
//! ## Middleware
//!
//! ```ignore
//! use accounts::auth::middleware::auth_middleware;
//!
//! let protected = Router::new()
//!     .route("/current", get(handler))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```
//!
//! ## Extracting the Principal in Handlers
//!
//! ```ignore
//! async fn protected_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.name)
//! }
//! ```
//!
//! # Configuration
//!
//! Configure via `accounts.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"   # Name of the env var holding the signing secret
//! token_ttl_secs = 2592000        # 30 days
//!
//! [auth.password]
//! memory_kib = 19456
//! iterations = 2
//! parallelism = 1
//! ```

/// JWT token generation and validation.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Password hashing and verification.
pub mod password;
