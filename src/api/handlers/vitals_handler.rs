//! Vitals handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Principal, RecordVitals, Vitals};
use crate::errors::AppResult;
use crate::types::Created;

/// Create vitals routes
pub fn vitals_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_vitals))
        .route("/:id", get(get_vitals))
}

/// Record a reading; values are converted to canonical units and alerts raised
#[utoipa::path(
    post,
    path = "/api/vitals",
    tag = "Vitals",
    security(("bearer_auth" = [])),
    request_body = RecordVitals,
    responses(
        (status = 201, description = "Vitals recorded with alerts", body = Vitals),
        (status = 400, description = "Empty or out-of-range reading, or inactive patient"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn record_vitals(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecordVitals>,
) -> AppResult<Created<Vitals>> {
    let vitals = state.services.vitals().record(&principal, payload).await?;
    Ok(Created(vitals))
}

#[utoipa::path(
    get,
    path = "/api/vitals/{id}",
    tag = "Vitals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vitals ID")),
    responses(
        (status = 200, description = "Vitals record", body = Vitals),
        (status = 404, description = "Vitals not found")
    )
)]
pub async fn get_vitals(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vitals>> {
    let vitals = state.services.vitals().get(&principal, id).await?;
    Ok(Json(vitals))
}
