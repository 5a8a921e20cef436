//! Prescription handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{CreatePrescription, Dispensing, Prescription, PrescriptionFilter, Principal};
use crate::errors::AppResult;
use crate::types::{Created, Paginated, PaginatedPrescriptions, PaginationParams};

/// Create prescription routes
pub fn prescription_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_prescriptions).post(create_prescription))
        .route("/:id", get(get_prescription))
        .route("/:id/cancel", post(cancel_prescription))
        .route("/:id/dispensings", get(prescription_dispensings))
}

#[utoipa::path(
    post,
    path = "/api/prescriptions",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    request_body = CreatePrescription,
    responses(
        (status = 201, description = "Prescription issued", body = Prescription),
        (status = 400, description = "No items or inactive patient"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn create_prescription(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePrescription>,
) -> AppResult<Created<Prescription>> {
    principal.require("prescriptions:create")?;
    let prescription = state
        .services
        .prescriptions()
        .create(&principal, payload)
        .await?;
    Ok(Created(prescription))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(PrescriptionFilter, PaginationParams),
    responses(
        (status = 200, description = "Prescriptions, newest first", body = PaginatedPrescriptions)
    )
)]
pub async fn list_prescriptions(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(filter): Query<PrescriptionFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Prescription>>> {
    principal.require("prescriptions:read")?;
    let prescriptions = state
        .services
        .prescriptions()
        .list(principal.tenant_id, filter, page)
        .await?;
    Ok(Json(prescriptions))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/{id}",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription", body = Prescription),
        (status = 404, description = "Prescription not found")
    )
)]
pub async fn get_prescription(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Prescription>> {
    principal.require("prescriptions:read")?;
    let prescription = state
        .services
        .prescriptions()
        .get(principal.tenant_id, id)
        .await?;
    Ok(Json(prescription))
}

/// Cancel an untouched prescription (prescriber only)
#[utoipa::path(
    post,
    path = "/api/prescriptions/{id}/cancel",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription cancelled", body = Prescription),
        (status = 400, description = "Already dispensed or not active"),
        (status = 403, description = "Not the prescriber"),
        (status = 404, description = "Prescription not found")
    )
)]
pub async fn cancel_prescription(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Prescription>> {
    let prescription = state
        .services
        .prescriptions()
        .cancel(&principal, id)
        .await?;
    Ok(Json(prescription))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/{id}/dispensings",
    tag = "Dispensing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Dispensings, oldest first", body = Vec<Dispensing>),
        (status = 404, description = "Prescription not found")
    )
)]
pub async fn prescription_dispensings(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Dispensing>>> {
    principal.require("dispensing:read")?;
    let dispensings = state
        .services
        .dispensing()
        .list_for_prescription(principal.tenant_id, id)
        .await?;
    Ok(Json(dispensings))
}
