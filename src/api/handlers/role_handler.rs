//! Role handlers.

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
    CreateRole, PermissionInfo, Principal, Role, RoleDetail, RoleFilter, UpdateRole,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginatedRoles, PaginationParams};

/// Create role routes
pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/permissions", get(list_permissions))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Roles",
    security(("bearer_auth" = [])),
    request_body = CreateRole,
    responses(
        (status = 201, description = "Role created", body = RoleDetail),
        (status = 400, description = "Unknown permission or parent"),
        (status = 409, description = "Code already used")
    )
)]
pub async fn create_role(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateRole>,
) -> AppResult<Created<RoleDetail>> {
    principal.require("roles:create")?;
    let role = state
        .services
        .roles()
        .create(principal.tenant_id, payload)
        .await?;
    Ok(Created(role))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(RoleFilter, PaginationParams),
    responses(
        (status = 200, description = "Roles sorted by name", body = PaginatedRoles)
    )
)]
pub async fn list_roles(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(filter): Query<RoleFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Role>>> {
    principal.require("roles:read")?;
    let roles = state
        .services
        .roles()
        .list(principal.tenant_id, filter, page)
        .await?;
    Ok(Json(roles))
}

/// The permission catalog
#[utoipa::path(
    get,
    path = "/api/roles/permissions",
    tag = "Roles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every known permission", body = Vec<PermissionInfo>)
    )
)]
pub async fn list_permissions(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PermissionInfo>>> {
    principal.require("roles:read")?;
    Ok(Json(state.services.roles().permissions()))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role with effective permissions", body = RoleDetail),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoleDetail>> {
    principal.require("roles:read")?;
    let role = state.services.roles().get(principal.tenant_id, id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated", body = RoleDetail),
        (status = 400, description = "System role, unknown permission or circular parent"),
        (status = 404, description = "Role not found")
    )
)]
pub async fn update_role(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRole>,
) -> AppResult<Json<RoleDetail>> {
    principal.require("roles:update")?;
    let role = state
        .services
        .roles()
        .update(principal.tenant_id, id, payload)
        .await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 400, description = "System role or role in use"),
        (status = 404, description = "Role not found")
    )
)]
pub async fn delete_role(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    principal.require("roles:delete")?;
    state.services.roles().delete(principal.tenant_id, id).await?;
    Ok(NoContent)
}
