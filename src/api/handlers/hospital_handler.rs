//! Hospital onboarding and profile handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post},
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Hospital, Principal, UpdateHospital};
use crate::errors::AppResult;
use crate::services::{OnboardHospital, OnboardResult};
use crate::types::Created;

/// Public onboarding route
pub fn onboarding_routes() -> Router<AppState> {
    Router::new().route("/onboard", post(onboard))
}

/// The caller's own hospital
pub fn hospital_routes() -> Router<AppState> {
    Router::new().route("/", get(get_current).put(update_current))
}

/// Register a new hospital with its first administrator
#[utoipa::path(
    post,
    path = "/api/hospitals/onboard",
    tag = "Hospital",
    request_body = OnboardHospital,
    responses(
        (status = 201, description = "Hospital onboarded", body = OnboardResult),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Hospital code already registered")
    )
)]
pub async fn onboard(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<OnboardHospital>,
) -> AppResult<Created<OnboardResult>> {
    let result = state.services.hospitals().onboard(payload).await?;
    Ok(Created(result))
}

#[utoipa::path(
    get,
    path = "/api/hospital",
    tag = "Hospital",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Hospital profile", body = Hospital),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
) -> AppResult<Json<Hospital>> {
    principal.require("hospital:read")?;
    let hospital = state.services.hospitals().get(principal.tenant_id).await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    put,
    path = "/api/hospital",
    tag = "Hospital",
    security(("bearer_auth" = [])),
    request_body = UpdateHospital,
    responses(
        (status = 200, description = "Hospital updated", body = Hospital),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Missing hospital:update")
    )
)]
pub async fn update_current(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateHospital>,
) -> AppResult<Json<Hospital>> {
    principal.require("hospital:update")?;
    let hospital = state
        .services
        .hospitals()
        .update(principal.tenant_id, payload)
        .await?;
    Ok(Json(hospital))
}
