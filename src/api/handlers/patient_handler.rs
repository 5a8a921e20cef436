//! Patient handlers, including the per-patient vitals views.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    Patient, PatientFilter, PatientSummary, Principal, RegisterPatient, UpdatePatient, Vitals,
};
use crate::errors::AppResult;
use crate::types::{Created, Paginated, PaginatedPatients, PaginatedVitals, PaginationParams};

/// Create patient routes
pub fn patient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_patients).post(register_patient))
        .route(
            "/:id",
            get(get_patient).put(update_patient).delete(deactivate_patient),
        )
        .route("/:id/summary", get(patient_summary))
        .route("/:id/vitals", get(patient_vitals))
        .route("/:id/vitals/latest", get(latest_vitals))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    tag = "Patients",
    security(("bearer_auth" = [])),
    request_body = RegisterPatient,
    responses(
        (status = 201, description = "Patient registered with a new MRN", body = Patient),
        (status = 400, description = "Invalid department or doctor"),
        (status = 409, description = "Patient already registered")
    )
)]
pub async fn register_patient(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPatient>,
) -> AppResult<Created<Patient>> {
    principal.require("patients:create")?;
    let patient = state
        .services
        .patients()
        .register(principal.tenant_id, payload)
        .await?;
    Ok(Created(patient))
}

#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(PatientFilter, PaginationParams),
    responses(
        (status = 200, description = "Patients sorted by name", body = PaginatedPatients)
    )
)]
pub async fn list_patients(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(filter): Query<PatientFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Patient>>> {
    principal.require("patients:read")?;
    let patients = state
        .services
        .patients()
        .list(principal.tenant_id, filter, page)
        .await?;
    Ok(Json(patients))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 403, description = "Patient belongs to another department"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn get_patient(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Patient>> {
    let patient = state.services.patients().get(&principal, id).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Patient ID")),
    request_body = UpdatePatient,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 403, description = "Patient belongs to another department"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn update_patient(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePatient>,
) -> AppResult<Json<Patient>> {
    let patient = state
        .services
        .patients()
        .update(&principal, id, payload)
        .await?;
    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deactivated", body = Patient),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn deactivate_patient(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Patient>> {
    principal.require("patients:delete")?;
    let patient = state
        .services
        .patients()
        .deactivate(principal.tenant_id, id)
        .await?;
    Ok(Json(patient))
}

/// Patient with latest vitals, open prescriptions and upcoming appointments
#[utoipa::path(
    get,
    path = "/api/patients/{id}/summary",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Clinical summary", body = PatientSummary),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn patient_summary(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PatientSummary>> {
    let summary = state.services.patients().summary(&principal, id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/vitals",
    tag = "Vitals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Patient ID"), PaginationParams),
    responses(
        (status = 200, description = "Vitals, newest first", body = PaginatedVitals),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn patient_vitals(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Vitals>>> {
    let vitals = state
        .services
        .vitals()
        .list_for_patient(&principal, id, page)
        .await?;
    Ok(Json(vitals))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/vitals/latest",
    tag = "Vitals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Latest reading, or null when none exist", body = Vitals),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn latest_vitals(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Option<Vitals>>> {
    let vitals = state
        .services
        .vitals()
        .latest_for_patient(&principal, id)
        .await?;
    Ok(Json(vitals))
}
