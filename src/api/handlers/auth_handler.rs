//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::{LoginRequest, TokenResponse};

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login with hospital code, email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Hospital suspended"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.services.auth().login(payload).await?;
    Ok(Json(token))
}
