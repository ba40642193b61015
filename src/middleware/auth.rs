use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::Actor;
use crate::error::ApiError;

/// Resolves the caller and stores it as an [`Actor`] request extension.
///
/// Requests without an `Authorization` header continue as `Actor::Anonymous`
/// and are turned away by the access policy in the handler. A header that is
/// present but unusable (wrong scheme, bad signature, revoked or expired
/// token, deleted user) is rejected here with 401.
pub async fn actor_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = match extract_bearer(&headers)? {
        None => Actor::Anonymous,
        Some(token) => Actor::Authenticated(state.accounts().resolve(token).await?),
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// `Ok(None)` when no Authorization header was sent
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::not_authenticated("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        Some(_) => Err(ApiError::not_authenticated("Empty bearer token")),
        None => Err(ApiError::not_authenticated("Authorization header must use Bearer token format")),
    }
}
