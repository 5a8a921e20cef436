//! Dispensing handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{DispenseOutcome, DispenseRequest, Dispensing, Principal};
use crate::errors::AppResult;
use crate::types::Created;

/// Create dispensing routes
pub fn dispensing_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(dispense))
        .route("/:id", get(get_dispensing))
}

/// Dispense against a prescription
#[utoipa::path(
    post,
    path = "/api/dispensing",
    tag = "Dispensing",
    security(("bearer_auth" = [])),
    request_body = DispenseRequest,
    responses(
        (status = 201, description = "Dispensing recorded", body = DispenseOutcome),
        (status = 400, description = "Invalid status, item or quantity"),
        (status = 404, description = "Prescription not found")
    )
)]
pub async fn dispense(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DispenseRequest>,
) -> AppResult<Created<DispenseOutcome>> {
    principal.require("dispensing:create")?;
    let outcome = state
        .services
        .dispensing()
        .dispense(&principal, payload)
        .await?;
    Ok(Created(outcome))
}

#[utoipa::path(
    get,
    path = "/api/dispensing/{id}",
    tag = "Dispensing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Dispensing ID")),
    responses(
        (status = 200, description = "Dispensing record", body = Dispensing),
        (status = 404, description = "Dispensing not found")
    )
)]
pub async fn get_dispensing(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Dispensing>> {
    principal.require("dispensing:read")?;
    let dispensing = state
        .services
        .dispensing()
        .get(principal.tenant_id, id)
        .await?;
    Ok(Json(dispensing))
}
