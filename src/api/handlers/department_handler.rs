//! Department handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    CreateDepartment, Department, DepartmentFilter, DepartmentNode, DepartmentStaff, Principal,
    UpdateDepartment,
};
use crate::errors::AppResult;
use crate::types::{Created, Paginated, PaginatedDepartments, PaginationParams};

/// Create department routes
pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route("/tree", get(department_tree))
        .route(
            "/:id",
            get(get_department)
                .put(update_department)
                .delete(deactivate_department),
        )
        .route("/:id/activate", post(activate_department))
        .route("/:id/staff", get(department_staff))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Departments",
    security(("bearer_auth" = [])),
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid parent or head"),
        (status = 409, description = "Code already used")
    )
)]
pub async fn create_department(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDepartment>,
) -> AppResult<Created<Department>> {
    principal.require("departments:create")?;
    let department = state
        .services
        .departments()
        .create(principal.tenant_id, payload)
        .await?;
    Ok(Created(department))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(DepartmentFilter, PaginationParams),
    responses(
        (status = 200, description = "Departments sorted by name", body = PaginatedDepartments)
    )
)]
pub async fn list_departments(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(filter): Query<DepartmentFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Department>>> {
    principal.require("departments:read")?;
    let departments = state
        .services
        .departments()
        .list(principal.tenant_id, filter, page)
        .await?;
    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/tree",
    tag = "Departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Department hierarchy", body = Vec<DepartmentNode>)
    )
)]
pub async fn department_tree(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DepartmentNode>>> {
    principal.require("departments:read")?;
    let tree = state.services.departments().tree(principal.tenant_id).await?;
    Ok(Json(tree))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department", body = Department),
        (status = 404, description = "Department not found")
    )
)]
pub async fn get_department(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    principal.require("departments:read")?;
    let department = state
        .services
        .departments()
        .get(principal.tenant_id, id)
        .await?;
    Ok(Json(department))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = UpdateDepartment,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Circular reference or invalid parent"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Code already used")
    )
)]
pub async fn update_department(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateDepartment>,
) -> AppResult<Json<Department>> {
    principal.require("departments:update")?;
    let department = state
        .services
        .departments()
        .update(principal.tenant_id, id, payload)
        .await?;
    Ok(Json(department))
}

/// Deactivate a department (soft delete)
#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deactivated", body = Department),
        (status = 400, description = "Active staff or sub-departments remain"),
        (status = 404, description = "Department not found")
    )
)]
pub async fn deactivate_department(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    principal.require("departments:delete")?;
    let department = state
        .services
        .departments()
        .deactivate(principal.tenant_id, id)
        .await?;
    Ok(Json(department))
}

#[utoipa::path(
    post,
    path = "/api/departments/{id}/activate",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department reactivated", body = Department),
        (status = 404, description = "Department not found")
    )
)]
pub async fn activate_department(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    principal.require("departments:delete")?;
    let department = state
        .services
        .departments()
        .activate(principal.tenant_id, id)
        .await?;
    Ok(Json(department))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}/staff",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Head and active members", body = DepartmentStaff),
        (status = 404, description = "Department not found")
    )
)]
pub async fn department_staff(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DepartmentStaff>> {
    principal.require("departments:read")?;
    let roster = state
        .services
        .departments()
        .staff(principal.tenant_id, id)
        .await?;
    Ok(Json(roster))
}
