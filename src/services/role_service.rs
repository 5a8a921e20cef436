//! Role service - role management and the permission catalog.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    catalog, creates_cycle, is_known_permission, normalize_code, resolve_permissions, CreateRole,
    PermissionInfo, RecordStatus, Role, RoleDetail, RoleFilter, UpdateRole,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait RoleService: Send + Sync {
    async fn create(&self, tenant_id: Uuid, input: CreateRole) -> AppResult<RoleDetail>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: RoleFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Role>>;

    /// Role with its effective (inherited) permissions
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<RoleDetail>;

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateRole) -> AppResult<RoleDetail>;

    /// Soft delete
    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()>;

    /// Every known permission
    fn permissions(&self) -> Vec<PermissionInfo>;
}

pub struct RoleManager<U: UnitOfWork> {
    uow: Arc<U>,
}

fn validate_permissions(permissions: &[String]) -> AppResult<()> {
    match permissions.iter().find(|p| !is_known_permission(p)) {
        Some(unknown) => Err(AppError::bad_request(
            "INVALID_PERMISSION",
            format!("Unknown permission: {}", unknown),
        )),
        None => Ok(()),
    }
}

fn system_role_immutable() -> AppError {
    AppError::bad_request(
        "SYSTEM_ROLE_IMMUTABLE",
        "System roles cannot change code or permissions, nor be deleted",
    )
}

impl<U: UnitOfWork> RoleManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Role> {
        self.uow
            .roles()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_not_found("ROLE_NOT_FOUND", "Role")
    }

    async fn ensure_code_free(&self, tenant_id: Uuid, code: &str) -> AppResult<()> {
        if self.uow.roles().find_by_code(tenant_id, code).await?.is_some() {
            return Err(AppError::conflict(
                "ROLE_EXISTS",
                format!("Role code {} already exists", code),
            ));
        }
        Ok(())
    }

    async fn ensure_active_parent(&self, tenant_id: Uuid, parent_id: Uuid) -> AppResult<()> {
        match self.uow.roles().find_by_id(tenant_id, parent_id).await? {
            Some(role) if role.is_active() => Ok(()),
            _ => Err(AppError::bad_request(
                "PARENT_NOT_FOUND",
                "Parent role not found",
            )),
        }
    }

    async fn detail(&self, role: Role) -> AppResult<RoleDetail> {
        let mut roles: HashMap<Uuid, Role> = self
            .uow
            .roles()
            .list_all(role.tenant_id)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        roles.insert(role.id, role.clone());

        let mut effective = resolve_permissions(&[role.id], &roles);
        // an inactive role still shows what it would grant
        if !role.is_active() {
            effective.extend(role.permissions.iter().cloned());
        }

        Ok(RoleDetail {
            effective_permissions: effective.to_vec(),
            role,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> RoleService for RoleManager<U> {
    async fn create(&self, tenant_id: Uuid, input: CreateRole) -> AppResult<RoleDetail> {
        let code = normalize_code(&input.code);
        self.ensure_code_free(tenant_id, &code).await?;
        validate_permissions(&input.permissions)?;
        if let Some(parent_id) = input.parent_id {
            self.ensure_active_parent(tenant_id, parent_id).await?;
        }

        let mut role = Role::new(tenant_id, input.name, &code, input.permissions);
        role.description = input.description;
        role.parent_id = input.parent_id;

        let role = self.uow.roles().insert(&role).await?;
        tracing::info!(tenant = %tenant_id, role = %role.id, code = %role.code, "Role created");
        self.detail(role).await
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: RoleFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Role>> {
        let (rows, total) = self.uow.roles().list(tenant_id, &filter, page).await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<RoleDetail> {
        let role = self.find(tenant_id, id).await?;
        self.detail(role).await
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateRole) -> AppResult<RoleDetail> {
        let mut role = self.find(tenant_id, id).await?;

        let code = input.code.as_deref().map(normalize_code);
        let code_changes = code.as_ref().is_some_and(|c| *c != role.code);
        let parent_changes = input.parent_id.is_some_and(|p| p != role.parent_id);
        if role.is_system && (code_changes || parent_changes || input.permissions.is_some()) {
            return Err(system_role_immutable());
        }

        if let Some(code) = code.filter(|_| code_changes) {
            self.ensure_code_free(tenant_id, &code).await?;
            role.code = code;
        }

        if let Some(permissions) = input.permissions {
            validate_permissions(&permissions)?;
            role.permissions = permissions;
        }

        if let Some(parent) = input.parent_id {
            if let Some(parent_id) = parent {
                let repo = self.uow.roles();
                let cycle = creates_cycle(Some(id), parent_id, |node| {
                    let repo = repo.clone();
                    async move {
                        Ok(repo
                            .find_by_id(tenant_id, node)
                            .await?
                            .map(|r| r.parent_id))
                    }
                })
                .await?;
                if cycle {
                    return Err(AppError::bad_request(
                        "CIRCULAR_REFERENCE",
                        "Role cannot inherit from itself or a descendant",
                    ));
                }
                self.ensure_active_parent(tenant_id, parent_id).await?;
            }
            role.parent_id = parent;
        }

        if let Some(name) = input.name {
            role.name = name;
        }
        if input.description.is_some() {
            role.description = input.description;
        }
        role.updated_at = Utc::now();

        let role = self.uow.roles().update(&role).await?;
        self.detail(role).await
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut role = self.find(tenant_id, id).await?;
        if role.is_system {
            return Err(system_role_immutable());
        }

        let holders = self
            .uow
            .staff()
            .count_active_with_role(tenant_id, id)
            .await?;
        if holders > 0 {
            return Err(AppError::bad_request(
                "ROLE_IN_USE",
                format!("Role is assigned to {} active staff", holders),
            ));
        }

        let children = self.uow.roles().count_active_children(tenant_id, id).await?;
        if children > 0 {
            return Err(AppError::bad_request(
                "ROLE_IN_USE",
                format!("Role is the parent of {} active roles", children),
            ));
        }

        role.status = RecordStatus::Inactive;
        role.updated_at = Utc::now();
        self.uow.roles().update(&role).await?;
        tracing::info!(tenant = %tenant_id, role = %id, "Role deleted");
        Ok(())
    }

    fn permissions(&self) -> Vec<PermissionInfo> {
        catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::system_roles;
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;

    fn create_input(code: &str, permissions: &[&str]) -> CreateRole {
        CreateRole {
            name: "Ward Nurse".into(),
            code: code.into(),
            description: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_returns_inherited_permissions() {
        let tenant = Uuid::new_v4();
        let seeded = system_roles(tenant);
        let staff_role = seeded.iter().find(|r| r.code == "STAFF").unwrap().clone();
        let parent_id = staff_role.id;

        let mut uow = TestUnitOfWork::default();
        uow.roles.expect_find_by_code().returning(|_, _| Ok(None));
        let parent = staff_role.clone();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(parent.clone())));
        uow.roles.expect_insert().returning(|r| Ok(r.clone()));
        uow.roles.expect_list_all().returning(move |tenant_id| {
            let mut all = system_roles(tenant_id);
            for r in all.iter_mut().filter(|r| r.code == "STAFF") {
                r.id = parent_id;
            }
            Ok(all)
        });

        let service = RoleManager::new(uow.build());
        let mut input = create_input("ward_nurse", &["vitals:create"]);
        input.parent_id = Some(parent_id);
        let detail = service.create(tenant, input).await.unwrap();

        assert_eq!(detail.role.code, "WARD_NURSE");
        assert!(detail
            .effective_permissions
            .contains(&"vitals:create".to_string()));
        assert!(detail
            .effective_permissions
            .contains(&"departments:read".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_permission_is_rejected() {
        let mut uow = TestUnitOfWork::default();
        uow.roles.expect_find_by_code().returning(|_, _| Ok(None));
        uow.roles.expect_insert().never();

        let service = RoleManager::new(uow.build());
        let err = service
            .create(Uuid::new_v4(), create_input("X1", &["patients:teleport"]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PERMISSION");
    }

    #[tokio::test]
    async fn test_duplicate_role_code() {
        let tenant = Uuid::new_v4();
        let existing = Role::new(tenant, "Nurse".into(), "NURSE", vec![]);
        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_code()
            .returning(move |_, _| Ok(Some(existing.clone())));

        let service = RoleManager::new(uow.build());
        let err = service
            .create(tenant, create_input("nurse", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ROLE_EXISTS");
    }

    #[tokio::test]
    async fn test_system_role_permissions_are_immutable() {
        let tenant = Uuid::new_v4();
        let admin = system_roles(tenant).remove(0);
        let id = admin.id;

        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(admin.clone())));
        uow.roles.expect_update().never();

        let service = RoleManager::new(uow.build());
        let err = service
            .update(
                tenant,
                id,
                UpdateRole {
                    permissions: Some(vec!["patients:read".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SYSTEM_ROLE_IMMUTABLE");
    }

    #[tokio::test]
    async fn test_system_role_parent_is_immutable() {
        let tenant = Uuid::new_v4();
        let staff = system_roles(tenant)
            .into_iter()
            .find(|r| r.code == "STAFF")
            .unwrap();
        let id = staff.id;

        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(staff.clone())));
        uow.roles.expect_update().never();

        let service = RoleManager::new(uow.build());
        let err = service
            .update(
                tenant,
                id,
                UpdateRole {
                    parent_id: Some(Some(Uuid::new_v4())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SYSTEM_ROLE_IMMUTABLE");
    }

    #[tokio::test]
    async fn test_system_role_can_be_renamed() {
        let tenant = Uuid::new_v4();
        let admin = system_roles(tenant).remove(0);
        let id = admin.id;
        let code = admin.code.clone();
        let stored = admin.clone();

        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(stored.clone())));
        uow.roles.expect_update().returning(|r| Ok(r.clone()));
        uow.roles
            .expect_list_all()
            .returning(move |_| Ok(vec![admin.clone()]));

        let service = RoleManager::new(uow.build());
        let detail = service
            .update(
                tenant,
                id,
                UpdateRole {
                    name: Some("Chief Administrator".into()),
                    code: Some(code.to_lowercase()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(detail.role.name, "Chief Administrator");
        assert_eq!(detail.effective_permissions, vec!["*".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_role_in_use() {
        let tenant = Uuid::new_v4();
        let role = Role::new(tenant, "Ward Nurse".into(), "WARD_NURSE", vec![]);
        let id = role.id;

        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(role.clone())));
        uow.staff
            .expect_count_active_with_role()
            .returning(|_, _| Ok(2));

        let service = RoleManager::new(uow.build());
        let err = service.delete(tenant, id).await.unwrap_err();
        assert_eq!(err.code(), "ROLE_IN_USE");
    }

    #[tokio::test]
    async fn test_delete_parent_of_active_role() {
        let tenant = Uuid::new_v4();
        let role = Role::new(tenant, "Clinical".into(), "CLINICAL", vec![]);
        let id = role.id;

        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(role.clone())));
        uow.staff
            .expect_count_active_with_role()
            .returning(|_, _| Ok(0));
        uow.roles
            .expect_count_active_children()
            .returning(|_, _| Ok(1));

        let service = RoleManager::new(uow.build());
        let err = service.delete(tenant, id).await.unwrap_err();
        assert_eq!(err.code(), "ROLE_IN_USE");
    }

    #[tokio::test]
    async fn test_delete_system_role_is_refused() {
        let tenant = Uuid::new_v4();
        let staff_role = system_roles(tenant).remove(1);
        let id = staff_role.id;

        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(staff_role.clone())));

        let service = RoleManager::new(uow.build());
        let err = service.delete(tenant, id).await.unwrap_err();
        assert_eq!(err.code(), "SYSTEM_ROLE_IMMUTABLE");
    }

    #[tokio::test]
    async fn test_parent_cycle_is_rejected() {
        let tenant = Uuid::new_v4();
        let parent = Role::new(tenant, "Clinical".into(), "CLINICAL", vec![]);
        let mut child = Role::new(tenant, "Ward".into(), "WARD", vec![]);
        child.parent_id = Some(parent.id);
        let (parent_id, child_id) = (parent.id, child.id);
        let roles: HashMap<Uuid, Role> =
            [parent, child].into_iter().map(|r| (r.id, r)).collect();

        let mut uow = TestUnitOfWork::default();
        uow.roles
            .expect_find_by_id()
            .returning(move |_, id| Ok(roles.get(&id).cloned()));

        let service = RoleManager::new(uow.build());
        let err = service
            .update(
                tenant,
                parent_id,
                UpdateRole {
                    parent_id: Some(Some(child_id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CIRCULAR_REFERENCE");
    }
}
