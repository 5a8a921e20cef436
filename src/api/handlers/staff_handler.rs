//! Staff (user) handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    AssignRoles, ChangePassword, CreateStaff, Principal, StaffFilter, StaffProfile,
    StaffResponse, UpdateStaff,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginatedStaff, PaginationParams};

/// Create user routes
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/me", get(get_current_user))
        .route("/me/password", put(change_password))
        .route(
            "/:id",
            get(get_staff).put(update_staff).delete(deactivate_staff),
        )
        .route("/:id/roles", put(assign_roles))
        .route("/:id/activate", post(activate_staff))
}

/// Get the authenticated staff member with effective permissions
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = StaffProfile),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
) -> AppResult<Json<StaffProfile>> {
    let profile = state.services.staff().me(&principal).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/me/password",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Current password is incorrect")
    )
)]
pub async fn change_password(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePassword>,
) -> AppResult<NoContent> {
    state
        .services
        .staff()
        .change_password(&principal, payload)
        .await?;
    Ok(NoContent)
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff member created", body = StaffResponse),
        (status = 400, description = "Invalid role or department"),
        (status = 409, description = "Email already used")
    )
)]
pub async fn create_staff(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateStaff>,
) -> AppResult<Created<StaffResponse>> {
    principal.require("users:create")?;
    if !payload.role_ids.is_empty() {
        principal.require("users:assign_roles")?;
    }
    let staff = state
        .services
        .staff()
        .create(principal.tenant_id, payload)
        .await?;
    Ok(Created(staff))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(StaffFilter, PaginationParams),
    responses(
        (status = 200, description = "Staff sorted by name", body = PaginatedStaff)
    )
)]
pub async fn list_staff(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(filter): Query<StaffFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<StaffResponse>>> {
    principal.require("users:read")?;
    let staff = state
        .services
        .staff()
        .list(principal.tenant_id, filter, page)
        .await?;
    Ok(Json(staff))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member", body = StaffResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_staff(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StaffResponse>> {
    if principal.staff_id != id {
        principal.require("users:read")?;
    }
    let staff = state.services.staff().get(principal.tenant_id, id).await?;
    Ok(Json(staff))
}

/// Update a profile (own profile, or any with users:update)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    request_body = UpdateStaff,
    responses(
        (status = 200, description = "Staff member updated", body = StaffResponse),
        (status = 400, description = "Invalid department"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_staff(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStaff>,
) -> AppResult<Json<StaffResponse>> {
    if principal.staff_id != id || payload.department_id.is_some() {
        principal.require("users:update")?;
    }
    let staff = state
        .services
        .staff()
        .update(principal.tenant_id, id, payload)
        .await?;
    Ok(Json(staff))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/roles",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    request_body = AssignRoles,
    responses(
        (status = 200, description = "Roles replaced", body = StaffResponse),
        (status = 400, description = "Invalid role"),
        (status = 404, description = "User not found")
    )
)]
pub async fn assign_roles(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AssignRoles>,
) -> AppResult<Json<StaffResponse>> {
    principal.require("users:assign_roles")?;
    let staff = state
        .services
        .staff()
        .assign_roles(principal.tenant_id, id, payload)
        .await?;
    Ok(Json(staff))
}

/// Deactivate a staff member (cannot deactivate self)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member deactivated", body = StaffResponse),
        (status = 400, description = "Self-deactivation or department head"),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_staff(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StaffResponse>> {
    principal.require("users:delete")?;
    let staff = state.services.staff().deactivate(&principal, id).await?;
    Ok(Json(staff))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/activate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member reactivated", body = StaffResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn activate_staff(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StaffResponse>> {
    principal.require("users:delete")?;
    let staff = state
        .services
        .staff()
        .activate(principal.tenant_id, id)
        .await?;
    Ok(Json(staff))
}
