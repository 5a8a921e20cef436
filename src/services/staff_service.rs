//! Staff service - staff accounts, role assignment and passwords.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    normalize_email, AssignRoles, ChangePassword, CreateStaff, Password, Principal, RecordStatus,
    Staff, StaffFilter, StaffProfile, StaffResponse, UpdateStaff,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait StaffService: Send + Sync {
    async fn create(&self, tenant_id: Uuid, input: CreateStaff) -> AppResult<StaffResponse>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: StaffFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<StaffResponse>>;

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<StaffResponse>;

    /// The caller's own profile and effective permissions
    async fn me(&self, principal: &Principal) -> AppResult<StaffProfile>;

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateStaff)
        -> AppResult<StaffResponse>;

    /// Replace the staff member's role assignment
    async fn assign_roles(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: AssignRoles,
    ) -> AppResult<StaffResponse>;

    /// Change the caller's own password
    async fn change_password(&self, principal: &Principal, input: ChangePassword)
        -> AppResult<()>;

    async fn deactivate(&self, principal: &Principal, id: Uuid) -> AppResult<StaffResponse>;

    async fn activate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<StaffResponse>;
}

pub struct StaffManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> StaffManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Staff> {
        self.uow
            .staff()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_not_found("USER_NOT_FOUND", "User")
    }

    async fn ensure_active_roles(&self, tenant_id: Uuid, role_ids: &[Uuid]) -> AppResult<()> {
        if role_ids.is_empty() {
            return Ok(());
        }
        let roles = self.uow.roles().list_all(tenant_id).await?;
        for role_id in role_ids {
            if !roles.iter().any(|r| r.id == *role_id && r.is_active()) {
                return Err(AppError::bad_request(
                    "INVALID_ROLE",
                    format!("Role {} does not exist or is inactive", role_id),
                ));
            }
        }
        Ok(())
    }

    async fn ensure_active_department(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> AppResult<()> {
        match self
            .uow
            .departments()
            .find_by_id(tenant_id, department_id)
            .await?
        {
            Some(department) if department.is_active() => Ok(()),
            _ => Err(AppError::bad_request(
                "INVALID_DEPARTMENT",
                "Department does not exist or is inactive",
            )),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> StaffService for StaffManager<U> {
    async fn create(&self, tenant_id: Uuid, input: CreateStaff) -> AppResult<StaffResponse> {
        let email = normalize_email(&input.email);
        if self
            .uow
            .staff()
            .find_by_email(tenant_id, &email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "EMAIL_EXISTS",
                "A staff member with this email already exists",
            ));
        }

        let password = Password::new(&input.password)?;
        self.ensure_active_roles(tenant_id, &input.role_ids).await?;
        if let Some(department_id) = input.department_id {
            self.ensure_active_department(tenant_id, department_id)
                .await?;
        }

        let mut staff = Staff::new(
            tenant_id,
            &email,
            password.into_string(),
            input.first_name,
            input.last_name,
        );
        staff.phone = input.phone;
        staff.job_title = input.job_title;
        staff.department_id = input.department_id;
        staff.role_ids = input.role_ids;

        let staff = self.uow.staff().insert(&staff).await?;
        tracing::info!(tenant = %tenant_id, staff = %staff.id, "Staff member created");
        Ok(staff.into())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: StaffFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<StaffResponse>> {
        let (rows, total) = self.uow.staff().list(tenant_id, &filter, page).await?;
        Ok(Paginated::new(rows, page, total).map(StaffResponse::from))
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<StaffResponse> {
        self.find(tenant_id, id).await.map(StaffResponse::from)
    }

    async fn me(&self, principal: &Principal) -> AppResult<StaffProfile> {
        let staff = self.find(principal.tenant_id, principal.staff_id).await?;
        Ok(StaffProfile {
            staff: staff.into(),
            permissions: principal.permissions.to_vec(),
        })
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateStaff,
    ) -> AppResult<StaffResponse> {
        let mut staff = self.find(tenant_id, id).await?;

        if let Some(department_id) = input.department_id {
            if staff.department_id != Some(department_id) {
                self.ensure_active_department(tenant_id, department_id)
                    .await?;
            }
            staff.department_id = Some(department_id);
        }
        if let Some(first_name) = input.first_name {
            staff.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            staff.last_name = last_name;
        }
        if input.phone.is_some() {
            staff.phone = input.phone;
        }
        if input.job_title.is_some() {
            staff.job_title = input.job_title;
        }
        staff.updated_at = Utc::now();

        self.uow.staff().update(&staff).await.map(StaffResponse::from)
    }

    async fn assign_roles(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: AssignRoles,
    ) -> AppResult<StaffResponse> {
        let mut staff = self.find(tenant_id, id).await?;

        let mut role_ids = input.role_ids;
        role_ids.sort();
        role_ids.dedup();
        self.ensure_active_roles(tenant_id, &role_ids).await?;

        staff.role_ids = role_ids;
        staff.updated_at = Utc::now();
        let staff = self.uow.staff().update(&staff).await?;
        tracing::info!(tenant = %tenant_id, staff = %id, roles = ?staff.role_ids, "Roles assigned");
        Ok(staff.into())
    }

    async fn change_password(
        &self,
        principal: &Principal,
        input: ChangePassword,
    ) -> AppResult<()> {
        let mut staff = self.find(principal.tenant_id, principal.staff_id).await?;

        if !Password::from_hash(staff.password_hash.clone()).verify(&input.current_password) {
            return Err(AppError::bad_request(
                "INVALID_PASSWORD",
                "Current password is incorrect",
            ));
        }

        staff.password_hash = Password::new(&input.new_password)?.into_string();
        staff.updated_at = Utc::now();
        self.uow.staff().update(&staff).await?;
        tracing::info!(staff = %staff.id, "Password changed");
        Ok(())
    }

    async fn deactivate(&self, principal: &Principal, id: Uuid) -> AppResult<StaffResponse> {
        if id == principal.staff_id {
            return Err(AppError::bad_request(
                "CANNOT_DEACTIVATE_SELF",
                "You cannot deactivate your own account",
            ));
        }

        let tenant_id = principal.tenant_id;
        let mut staff = self.find(tenant_id, id).await?;

        let headed = self
            .uow
            .departments()
            .count_active_headed_by(tenant_id, id)
            .await?;
        if headed > 0 {
            return Err(AppError::bad_request(
                "IS_DEPARTMENT_HEAD",
                "Reassign the departments this staff member heads first",
            ));
        }

        staff.set_status(RecordStatus::Inactive);
        let staff = self.uow.staff().update(&staff).await?;
        tracing::info!(
            tenant = %tenant_id,
            staff = %id,
            by = %principal.staff_id,
            "Staff deactivated"
        );
        Ok(staff.into())
    }

    async fn activate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<StaffResponse> {
        let mut staff = self.find(tenant_id, id).await?;
        staff.set_status(RecordStatus::Active);
        self.uow.staff().update(&staff).await.map(StaffResponse::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{system_roles, Department, PermissionSet};
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;

    fn create_input(role_ids: Vec<Uuid>) -> CreateStaff {
        CreateStaff {
            email: "Ada.Obi@CityGen.org".into(),
            password: "SecurePass123".into(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            phone: None,
            job_title: Some("Staff Nurse".into()),
            department_id: None,
            role_ids,
        }
    }

    fn principal(tenant_id: Uuid, staff_id: Uuid) -> Principal {
        Principal {
            staff_id,
            tenant_id,
            department_id: None,
            email: "admin@citygen.org".into(),
            permissions: PermissionSet::from_iter(["*"]),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_lowercases_email() {
        let tenant = Uuid::new_v4();
        let roles = system_roles(tenant);
        let nurse = roles.iter().find(|r| r.code == "NURSE").unwrap().id;

        let mut uow = TestUnitOfWork::default();
        uow.staff
            .expect_find_by_email()
            .withf(|_, email| email == "ada.obi@citygen.org")
            .returning(|_, _| Ok(None));
        uow.roles
            .expect_list_all()
            .returning(move |_| Ok(roles.clone()));
        uow.staff.expect_insert().returning(|s| {
            assert!(Password::from_hash(s.password_hash.clone()).verify("SecurePass123"));
            Ok(s.clone())
        });

        let service = StaffManager::new(uow.build());
        let created = service.create(tenant, create_input(vec![nurse])).await.unwrap();
        assert_eq!(created.email, "ada.obi@citygen.org");
        assert_eq!(created.role_ids, vec![nurse]);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let tenant = Uuid::new_v4();
        let existing = Staff::new(
            tenant,
            "ada.obi@citygen.org",
            "x".into(),
            "A".into(),
            "O".into(),
        );

        let mut uow = TestUnitOfWork::default();
        uow.staff
            .expect_find_by_email()
            .returning(move |_, _| Ok(Some(existing.clone())));
        uow.staff.expect_insert().never();

        let service = StaffManager::new(uow.build());
        let err = service.create(tenant, create_input(vec![])).await.unwrap_err();
        assert_eq!(err.code(), "EMAIL_EXISTS");
    }

    #[tokio::test]
    async fn test_unknown_role_is_invalid() {
        let tenant = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.staff.expect_find_by_email().returning(|_, _| Ok(None));
        uow.roles
            .expect_list_all()
            .returning(move |t| Ok(system_roles(t)));

        let service = StaffManager::new(uow.build());
        let err = service
            .create(tenant, create_input(vec![Uuid::new_v4()]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ROLE");
    }

    #[tokio::test]
    async fn test_inactive_department_is_invalid() {
        let tenant = Uuid::new_v4();
        let mut department = Department::new(tenant, "Old Wing".into(), "OLD");
        department.set_status(RecordStatus::Inactive);
        let department_id = department.id;

        let mut uow = TestUnitOfWork::default();
        uow.staff.expect_find_by_email().returning(|_, _| Ok(None));
        uow.departments
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(department.clone())));

        let service = StaffManager::new(uow.build());
        let mut input = create_input(vec![]);
        input.department_id = Some(department_id);
        let err = service.create(tenant, input).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_DEPARTMENT");
    }

    #[tokio::test]
    async fn test_cannot_deactivate_self() {
        let tenant = Uuid::new_v4();
        let me = Uuid::new_v4();
        let service = StaffManager::new(TestUnitOfWork::default().build());
        let err = service
            .deactivate(&principal(tenant, me), me)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CANNOT_DEACTIVATE_SELF");
    }

    #[tokio::test]
    async fn test_department_head_cannot_be_deactivated() {
        let tenant = Uuid::new_v4();
        let head = Staff::new(tenant, "head@h.org", "x".into(), "K".into(), "A".into());
        let head_id = head.id;

        let mut uow = TestUnitOfWork::default();
        uow.staff
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(head.clone())));
        uow.departments
            .expect_count_active_headed_by()
            .returning(|_, _| Ok(1));
        uow.staff.expect_update().never();

        let service = StaffManager::new(uow.build());
        let err = service
            .deactivate(&principal(tenant, Uuid::new_v4()), head_id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "IS_DEPARTMENT_HEAD");
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let tenant = Uuid::new_v4();
        let hash = Password::new("OldPassword1").unwrap().into_string();
        let staff = Staff::new(tenant, "me@h.org", hash, "A".into(), "B".into());
        let me = staff.id;

        let mut uow = TestUnitOfWork::default();
        uow.staff
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(staff.clone())));
        uow.staff.expect_update().never();

        let service = StaffManager::new(uow.build());
        let err = service
            .change_password(
                &principal(tenant, me),
                ChangePassword {
                    current_password: "NotMyPassword".into(),
                    new_password: "NewPassword1".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PASSWORD");
    }

    #[tokio::test]
    async fn test_me_reports_effective_permissions() {
        let tenant = Uuid::new_v4();
        let staff = Staff::new(tenant, "me@h.org", "x".into(), "A".into(), "B".into());
        let me = staff.id;

        let mut uow = TestUnitOfWork::default();
        uow.staff
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(staff.clone())));

        let service = StaffManager::new(uow.build());
        let profile = service.me(&principal(tenant, me)).await.unwrap();
        assert_eq!(profile.staff.id, me);
        assert_eq!(profile.permissions, vec!["*".to_string()]);
    }
}
