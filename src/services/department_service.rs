//! Department service - the department hierarchy of a hospital.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use crate::domain::{
    build_tree, creates_cycle, normalize_code, CreateDepartment, Department, DepartmentFilter,
    DepartmentNode, DepartmentStaff, RecordStatus, StaffResponse, UpdateDepartment,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait DepartmentService: Send + Sync {
    async fn create(&self, tenant_id: Uuid, input: CreateDepartment) -> AppResult<Department>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: DepartmentFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Department>>;

    /// Every department nested under its parent
    async fn tree(&self, tenant_id: Uuid) -> AppResult<Vec<DepartmentNode>>;

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Department>;

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDepartment,
    ) -> AppResult<Department>;

    /// Soft delete; refused while active staff or sub-departments remain
    async fn deactivate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Department>;

    async fn activate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Department>;

    /// Head and active members of a department
    async fn staff(&self, tenant_id: Uuid, id: Uuid) -> AppResult<DepartmentStaff>;
}

pub struct DepartmentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DepartmentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_code_free(&self, tenant_id: Uuid, code: &str) -> AppResult<()> {
        if self
            .uow
            .departments()
            .find_by_code(tenant_id, code)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "CODE_EXISTS",
                format!("Department code {} already exists", code),
            ));
        }
        Ok(())
    }

    async fn ensure_active_parent(&self, tenant_id: Uuid, parent_id: Uuid) -> AppResult<()> {
        self.uow
            .departments()
            .find_by_id(tenant_id, parent_id)
            .await?
            .filter(Department::is_active)
            .map(|_| ())
            .ok_or_else(|| {
                AppError::bad_request("PARENT_NOT_FOUND", "Parent department not found")
            })
    }

    async fn ensure_active_head(&self, tenant_id: Uuid, head_id: Uuid) -> AppResult<()> {
        match self.uow.staff().find_by_id(tenant_id, head_id).await? {
            Some(staff) if staff.is_active() => Ok(()),
            _ => Err(AppError::bad_request(
                "INVALID_HEAD",
                "Department head must be an active staff member",
            )),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> DepartmentService for DepartmentManager<U> {
    async fn create(&self, tenant_id: Uuid, input: CreateDepartment) -> AppResult<Department> {
        let code = normalize_code(&input.code);
        self.ensure_code_free(tenant_id, &code).await?;

        if let Some(parent_id) = input.parent_id {
            self.ensure_active_parent(tenant_id, parent_id).await?;
        }
        if let Some(head_id) = input.head_id {
            self.ensure_active_head(tenant_id, head_id).await?;
        }

        let mut department = Department::new(tenant_id, input.name, &code);
        department.description = input.description;
        department.parent_id = input.parent_id;
        department.head_id = input.head_id;

        let department = self.uow.departments().insert(&department).await?;
        tracing::info!(tenant = %tenant_id, department = %department.id, "Department created");
        Ok(department)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: DepartmentFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Department>> {
        let (rows, total) = self
            .uow
            .departments()
            .list(tenant_id, &filter, page)
            .await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn tree(&self, tenant_id: Uuid) -> AppResult<Vec<DepartmentNode>> {
        let departments = self.uow.departments().list_all(tenant_id).await?;
        Ok(build_tree(departments))
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Department> {
        self.uow
            .departments()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_not_found("DEPARTMENT_NOT_FOUND", "Department")
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDepartment,
    ) -> AppResult<Department> {
        let mut department = self.get(tenant_id, id).await?;

        if let Some(code) = input.code.as_deref().map(normalize_code) {
            if code != department.code {
                self.ensure_code_free(tenant_id, &code).await?;
                department.code = code;
            }
        }

        if let Some(parent) = input.parent_id {
            if let Some(parent_id) = parent {
                let repo = self.uow.departments();
                let cycle = creates_cycle(Some(id), parent_id, |node| {
                    let repo = repo.clone();
                    async move {
                        Ok(repo
                            .find_by_id(tenant_id, node)
                            .await?
                            .map(|d| d.parent_id))
                    }
                })
                .await?;
                if cycle {
                    return Err(AppError::bad_request(
                        "CIRCULAR_REFERENCE",
                        "Department cannot be nested under itself or a descendant",
                    ));
                }
                self.ensure_active_parent(tenant_id, parent_id).await?;
            }
            department.parent_id = parent;
        }

        if let Some(head) = input.head_id {
            if let Some(head_id) = head {
                self.ensure_active_head(tenant_id, head_id).await?;
            }
            department.head_id = head;
        }

        if let Some(name) = input.name {
            department.name = name;
        }
        if input.description.is_some() {
            department.description = input.description;
        }
        department.updated_at = Utc::now();

        self.uow.departments().update(&department).await
    }

    async fn deactivate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Department> {
        let mut department = self.get(tenant_id, id).await?;

        let staff = self
            .uow
            .staff()
            .count_active_in_department(tenant_id, id)
            .await?;
        if staff > 0 {
            return Err(AppError::bad_request(
                "HAS_ACTIVE_STAFF",
                format!("Department still has {} active staff", staff),
            ));
        }

        let children = self
            .uow
            .departments()
            .count_active_children(tenant_id, id)
            .await?;
        if children > 0 {
            return Err(AppError::bad_request(
                "HAS_ACTIVE_CHILDREN",
                format!("Department still has {} active sub-departments", children),
            ));
        }

        department.set_status(RecordStatus::Inactive);
        let department = self.uow.departments().update(&department).await?;
        tracing::info!(tenant = %tenant_id, department = %id, "Department deactivated");
        Ok(department)
    }

    async fn activate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Department> {
        let mut department = self.get(tenant_id, id).await?;
        department.set_status(RecordStatus::Active);
        self.uow.departments().update(&department).await
    }

    async fn staff(&self, tenant_id: Uuid, id: Uuid) -> AppResult<DepartmentStaff> {
        let department = self.get(tenant_id, id).await?;
        let staff_repo = self.uow.staff();

        let head = async {
            match department.head_id {
                Some(head_id) => staff_repo.find_by_id(tenant_id, head_id).await,
                None => Ok(None),
            }
        };
        let (head, members) =
            parallel::join2(head, staff_repo.list_by_department(tenant_id, id)).await?;

        Ok(DepartmentStaff {
            department,
            head: head.map(StaffResponse::from),
            members: members.into_iter().map(StaffResponse::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Staff;
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;
    use std::collections::HashMap;

    fn create_input(code: &str) -> CreateDepartment {
        CreateDepartment {
            name: "Cardiology".into(),
            code: code.into(),
            description: None,
            parent_id: None,
            head_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_code() {
        let tenant = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_code()
            .withf(|_, code| code == "CARDIO")
            .returning(|_, _| Ok(None));
        uow.departments
            .expect_insert()
            .times(1)
            .returning(|d| Ok(d.clone()));

        let service = DepartmentManager::new(uow.build());
        let created = service.create(tenant, create_input(" cardio ")).await.unwrap();
        assert_eq!(created.code, "CARDIO");
        assert_eq!(created.tenant_id, tenant);
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let tenant = Uuid::new_v4();
        let existing = Department::new(tenant, "Cardiology".into(), "CARDIO");

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_code()
            .returning(move |_, _| Ok(Some(existing.clone())));
        uow.departments.expect_insert().never();

        let service = DepartmentManager::new(uow.build());
        let err = service.create(tenant, create_input("cardio")).await.unwrap_err();
        assert_eq!(err.code(), "CODE_EXISTS");
    }

    #[tokio::test]
    async fn test_inactive_parent_is_rejected() {
        let tenant = Uuid::new_v4();
        let mut parent = Department::new(tenant, "Surgery".into(), "SURG");
        parent.set_status(RecordStatus::Inactive);
        let parent_id = parent.id;

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_code()
            .returning(|_, _| Ok(None));
        uow.departments
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(parent.clone())));

        let service = DepartmentManager::new(uow.build());
        let mut input = create_input("ORTHO");
        input.parent_id = Some(parent_id);
        let err = service.create(tenant, input).await.unwrap_err();
        assert_eq!(err.code(), "PARENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_moving_under_descendant_is_circular() {
        // root -> child -> grandchild; try to put root under grandchild
        let tenant = Uuid::new_v4();
        let root = Department::new(tenant, "Medicine".into(), "MED");
        let mut child = Department::new(tenant, "Cardiology".into(), "CARDIO");
        child.parent_id = Some(root.id);
        let mut grandchild = Department::new(tenant, "Cath Lab".into(), "CATH");
        grandchild.parent_id = Some(child.id);

        let root_id = root.id;
        let grandchild_id = grandchild.id;
        let by_id: HashMap<Uuid, Department> = [root, child, grandchild]
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .returning(move |_, id| Ok(by_id.get(&id).cloned()));
        uow.departments.expect_update().never();

        let service = DepartmentManager::new(uow.build());
        let err = service
            .update(
                tenant,
                root_id,
                UpdateDepartment {
                    parent_id: Some(Some(grandchild_id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CIRCULAR_REFERENCE");
    }

    #[tokio::test]
    async fn test_self_parent_is_circular() {
        let tenant = Uuid::new_v4();
        let department = Department::new(tenant, "Medicine".into(), "MED");
        let id = department.id;

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(department.clone())));

        let service = DepartmentManager::new(uow.build());
        let err = service
            .update(
                tenant,
                id,
                UpdateDepartment {
                    parent_id: Some(Some(id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CIRCULAR_REFERENCE");
    }

    #[tokio::test]
    async fn test_clearing_parent_skips_checks() {
        let tenant = Uuid::new_v4();
        let mut department = Department::new(tenant, "Cardiology".into(), "CARDIO");
        department.parent_id = Some(Uuid::new_v4());
        let id = department.id;

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .times(1)
            .returning(move |_, _| Ok(Some(department.clone())));
        uow.departments
            .expect_update()
            .returning(|d| Ok(d.clone()));

        let service = DepartmentManager::new(uow.build());
        let updated = service
            .update(
                tenant,
                id,
                UpdateDepartment {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.parent_id, None);
    }

    #[tokio::test]
    async fn test_deactivate_with_active_staff_fails() {
        let tenant = Uuid::new_v4();
        let department = Department::new(tenant, "Cardiology".into(), "CARDIO");
        let id = department.id;

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(department.clone())));
        uow.staff
            .expect_count_active_in_department()
            .returning(|_, _| Ok(3));
        uow.departments.expect_update().never();

        let service = DepartmentManager::new(uow.build());
        let err = service.deactivate(tenant, id).await.unwrap_err();
        assert_eq!(err.code(), "HAS_ACTIVE_STAFF");
    }

    #[tokio::test]
    async fn test_deactivate_with_active_children_fails() {
        let tenant = Uuid::new_v4();
        let department = Department::new(tenant, "Medicine".into(), "MED");
        let id = department.id;

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(department.clone())));
        uow.staff
            .expect_count_active_in_department()
            .returning(|_, _| Ok(0));
        uow.departments
            .expect_count_active_children()
            .returning(|_, _| Ok(1));

        let service = DepartmentManager::new(uow.build());
        let err = service.deactivate(tenant, id).await.unwrap_err();
        assert_eq!(err.code(), "HAS_ACTIVE_CHILDREN");
    }

    #[tokio::test]
    async fn test_deactivate_empty_department() {
        let tenant = Uuid::new_v4();
        let department = Department::new(tenant, "Medicine".into(), "MED");
        let id = department.id;

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(department.clone())));
        uow.staff
            .expect_count_active_in_department()
            .returning(|_, _| Ok(0));
        uow.departments
            .expect_count_active_children()
            .returning(|_, _| Ok(0));
        uow.departments
            .expect_update()
            .returning(|d| Ok(d.clone()));

        let service = DepartmentManager::new(uow.build());
        let updated = service.deactivate(tenant, id).await.unwrap();
        assert_eq!(updated.status, RecordStatus::Inactive);
    }

    #[tokio::test]
    async fn test_staff_roster_includes_head() {
        let tenant = Uuid::new_v4();
        let head = Staff::new(tenant, "head@h.org", "x".into(), "Kemi".into(), "Ade".into());
        let member = Staff::new(tenant, "rn@h.org", "x".into(), "Ada".into(), "Obi".into());
        let mut department = Department::new(tenant, "Cardiology".into(), "CARDIO");
        department.head_id = Some(head.id);
        let id = department.id;
        let head_id = head.id;

        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(department.clone())));
        uow.staff
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(head.clone())));
        uow.staff
            .expect_list_by_department()
            .returning(move |_, _| Ok(vec![member.clone()]));

        let service = DepartmentManager::new(uow.build());
        let roster = service.staff(tenant, id).await.unwrap();
        assert_eq!(roster.head.map(|h| h.id), Some(head_id));
        assert_eq!(roster.members.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_department_is_not_found() {
        let mut uow = TestUnitOfWork::default();
        uow.departments
            .expect_find_by_id()
            .returning(|_, _| Ok(None));

        let service = DepartmentManager::new(uow.build());
        let err = service
            .get(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DEPARTMENT_NOT_FOUND");
    }
}
