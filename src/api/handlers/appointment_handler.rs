//! Appointment handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    Appointment, AppointmentFilter, AppointmentView, BookAppointment, Principal,
    RescheduleAppointment, UpdateAppointmentStatus,
};
use crate::errors::AppResult;
use crate::types::{Created, Paginated, PaginatedAppointments, PaginationParams};

/// Create appointment routes
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(book_appointment))
        .route("/:id", get(get_appointment))
        .route("/:id/reschedule", put(reschedule_appointment))
        .route("/:id/status", put(update_appointment_status))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    request_body = BookAppointment,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Invalid patient, doctor, department or schedule"),
        (status = 409, description = "Doctor is not free in this slot")
    )
)]
pub async fn book_appointment(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BookAppointment>,
) -> AppResult<Created<Appointment>> {
    principal.require("appointments:create")?;
    let appointment = state
        .services
        .appointments()
        .book(principal.tenant_id, payload)
        .await?;
    Ok(Created(appointment))
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(AppointmentFilter, PaginationParams),
    responses(
        (status = 200, description = "Appointments by start time", body = PaginatedAppointments)
    )
)]
pub async fn list_appointments(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(filter): Query<AppointmentFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<AppointmentView>>> {
    principal.require("appointments:read")?;
    let appointments = state
        .services
        .appointments()
        .list(principal.tenant_id, filter, page)
        .await?;
    Ok(Json(appointments))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    principal.require("appointments:read")?;
    let appointment = state
        .services
        .appointments()
        .get(principal.tenant_id, id)
        .await?;
    Ok(Json(appointment))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}/reschedule",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = RescheduleAppointment,
    responses(
        (status = 200, description = "Appointment moved", body = Appointment),
        (status = 400, description = "Not scheduled or invalid schedule"),
        (status = 409, description = "Doctor is not free in this slot")
    )
)]
pub async fn reschedule_appointment(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RescheduleAppointment>,
) -> AppResult<Json<Appointment>> {
    principal.require("appointments:update")?;
    let appointment = state
        .services
        .appointments()
        .reschedule(principal.tenant_id, id, payload)
        .await?;
    Ok(Json(appointment))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}/status",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentStatus,
    responses(
        (status = 200, description = "Status changed", body = Appointment),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn update_appointment_status(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAppointmentStatus>,
) -> AppResult<Json<Appointment>> {
    principal.require("appointments:update")?;
    let appointment = state
        .services
        .appointments()
        .update_status(principal.tenant_id, id, payload)
        .await?;
    Ok(Json(appointment))
}
