//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::AppError;

/// JWT authentication middleware.
///
/// Validates the bearer token, resolves the caller's `Principal` (hospital
/// and staff status, effective permissions) and injects it into the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let auth = state.services.auth();
    let claims = auth.verify_token(token)?;
    let principal = auth.resolve_principal(&claims).await?;

    tracing::debug!(staff = %principal.staff_id, tenant = %principal.tenant_id, "Authenticated");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
