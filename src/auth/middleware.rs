use crate::types::{AppError, UserProfile};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// The principal resolved by [`auth_middleware`] for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

/// Extracts the `<token>` part of an `Authorization: Bearer <token>` header.
///
/// Returns `None` for a missing header, a non-UTF-8 value, any other scheme,
/// or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }

    Some(token)
}

/// Gate for protected routes.
///
/// Either attaches a [`CurrentUser`] and runs the rest of the stack, or
/// rejects with 401 without calling downstream handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        debug!("Rejected request without a usable bearer token");
        AppError::Unauthorized("missing or malformed Authorization header".to_string())
    })?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        debug!(reason = %e, "Rejected bearer token");
        AppError::Unauthorized(e.to_string())
    })?;

    // The account may have been deleted after the token was issued
    let user = state.db.get_user_by_id(&user_id).await?.ok_or_else(|| {
        debug!(user_id = %user_id, "Token subject no longer exists");
        AppError::Unauthorized("unknown principal".to_string())
    })?;

    req.extensions_mut().insert(CurrentUser(user.into()));

    Ok(next.run(req).await)
}

/// Handler extractor for the authenticated principal.
pub struct AuthUser(pub UserProfile);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|current| AuthUser(current.0.clone()))
            .ok_or_else(|| AppError::Unauthorized("route is not behind the auth gate".to_string()))
    }
}
