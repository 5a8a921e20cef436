//! Hospital service - tenant onboarding and the hospital profile.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{DEFAULT_DEPARTMENTS, DEPARTMENT_ADMINISTRATION, ROLE_HOSPITAL_ADMIN};
use crate::domain::department::CODE_RE;
use crate::domain::{
    normalize_code, system_roles, Department, Hospital, Password, Staff, StaffResponse,
    UpdateHospital,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

fn default_true() -> bool {
    true
}

/// Public onboarding request: the hospital plus its first administrator
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OnboardHospital {
    #[validate(length(min = 1, max = 200, message = "Hospital name is required"))]
    #[schema(example = "City General Hospital")]
    pub name: String,
    #[validate(length(min = 2, max = 32, message = "Code must be 2-32 characters"))]
    #[validate(regex(path = *CODE_RE, message = "Code may only contain letters, digits, _ and -"))]
    #[schema(example = "citygen")]
    pub code: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub license_number: Option<String>,
    #[schema(example = "Africa/Lagos")]
    pub timezone: Option<String>,
    #[validate(email(message = "Invalid admin email format"))]
    #[schema(example = "admin@citygeneral.org")]
    pub admin_email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub admin_password: String,
    #[validate(length(min = 1, message = "Admin first name is required"))]
    pub admin_first_name: String,
    #[validate(length(min = 1, message = "Admin last name is required"))]
    pub admin_last_name: String,
    /// Create the default departments (defaults to true)
    #[serde(default = "default_true")]
    pub seed_departments: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OnboardResult {
    pub hospital: Hospital,
    pub admin: StaffResponse,
}

#[async_trait]
pub trait HospitalService: Send + Sync {
    /// Create a tenant with its system roles, default departments and admin
    async fn onboard(&self, input: OnboardHospital) -> AppResult<OnboardResult>;

    async fn get(&self, tenant_id: Uuid) -> AppResult<Hospital>;

    async fn update(&self, tenant_id: Uuid, input: UpdateHospital) -> AppResult<Hospital>;
}

pub struct HospitalManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HospitalManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> HospitalService for HospitalManager<U> {
    async fn onboard(&self, input: OnboardHospital) -> AppResult<OnboardResult> {
        let code = normalize_code(&input.code);
        if self.uow.hospitals().find_by_code(&code).await?.is_some() {
            return Err(AppError::conflict(
                "HOSPITAL_EXISTS",
                format!("Hospital code {} is already registered", code),
            ));
        }

        let password = Password::new(&input.admin_password)?;

        let mut hospital = Hospital::new(input.name, &code, &input.email);
        hospital.phone = input.phone;
        hospital.address = input.address;
        hospital.license_number = input.license_number;
        if let Some(timezone) = input.timezone {
            hospital.timezone = timezone;
        }
        let tenant_id = hospital.id;

        let roles = system_roles(tenant_id);
        let admin_role = roles
            .iter()
            .find(|r| r.code == ROLE_HOSPITAL_ADMIN)
            .map(|r| r.id)
            .ok_or_else(|| AppError::internal("System roles missing HOSPITAL_ADMIN"))?;

        let departments: Vec<Department> = if input.seed_departments {
            DEFAULT_DEPARTMENTS
                .iter()
                .map(|(code, name)| Department::new(tenant_id, name.to_string(), code))
                .collect()
        } else {
            Vec::new()
        };

        let mut admin = Staff::new(
            tenant_id,
            &input.admin_email,
            password.into_string(),
            input.admin_first_name,
            input.admin_last_name,
        );
        admin.role_ids = vec![admin_role];
        admin.department_id = departments
            .iter()
            .find(|d| d.code == DEPARTMENT_ADMINISTRATION)
            .map(|d| d.id);

        let result = with_transaction!(self.uow, |ctx| {
            let hospital = ctx.hospitals().insert(&hospital).await?;
            // parents first: STAFF precedes the roles inheriting from it
            for role in &roles {
                ctx.roles().insert(role).await?;
            }
            for department in &departments {
                ctx.departments().insert(department).await?;
            }
            let admin = ctx.staff().insert(&admin).await?;
            Ok(OnboardResult {
                hospital,
                admin: admin.into(),
            })
        })?;

        tracing::info!(
            tenant = %result.hospital.id,
            code = %result.hospital.code,
            "Hospital onboarded"
        );
        Ok(result)
    }

    async fn get(&self, tenant_id: Uuid) -> AppResult<Hospital> {
        self.uow
            .hospitals()
            .find_by_id(tenant_id)
            .await?
            .ok_or_not_found("HOSPITAL_NOT_FOUND", "Hospital")
    }

    async fn update(&self, tenant_id: Uuid, input: UpdateHospital) -> AppResult<Hospital> {
        let mut hospital = self.get(tenant_id).await?;
        hospital.apply(input);
        self.uow.hospitals().update(&hospital).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;

    fn onboard_request() -> OnboardHospital {
        OnboardHospital {
            name: "City General".into(),
            code: "citygen".into(),
            email: "info@citygen.org".into(),
            phone: None,
            address: None,
            license_number: None,
            timezone: None,
            admin_email: "admin@citygen.org".into(),
            admin_password: "SecurePass123".into(),
            admin_first_name: "Ada".into(),
            admin_last_name: "Obi".into(),
            seed_departments: true,
        }
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected_before_transaction() {
        let existing = Hospital::new("Other".into(), "CITYGEN", "x@y.org");
        let mut uow = TestUnitOfWork::default();
        uow.hospitals
            .expect_find_by_code()
            .withf(|code| code == "CITYGEN")
            .returning(move |_| Ok(Some(existing.clone())));

        let service = HospitalManager::new(uow.build());
        let err = service.onboard(onboard_request()).await.unwrap_err();
        assert_eq!(err.code(), "HOSPITAL_EXISTS");
    }

    #[tokio::test]
    async fn test_short_admin_password_is_rejected() {
        let mut uow = TestUnitOfWork::default();
        uow.hospitals.expect_find_by_code().returning(|_| Ok(None));

        let service = HospitalManager::new(uow.build());
        let mut request = onboard_request();
        request.admin_password = "short".into();
        let err = service.onboard(request).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_applies_profile_changes() {
        let hospital = Hospital::new("City General".into(), "CITYGEN", "info@citygen.org");
        let tenant = hospital.id;

        let mut uow = TestUnitOfWork::default();
        uow.hospitals
            .expect_find_by_id()
            .returning(move |_| Ok(Some(hospital.clone())));
        uow.hospitals
            .expect_update()
            .returning(|h| Ok(h.clone()));

        let service = HospitalManager::new(uow.build());
        let updated = service
            .update(
                tenant,
                UpdateHospital {
                    timezone: Some("Africa/Lagos".into()),
                    email: Some("Desk@CityGen.org".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.timezone, "Africa/Lagos");
        assert_eq!(updated.email, "desk@citygen.org");
    }

    #[test]
    fn test_onboard_request_validation() {
        let mut request = onboard_request();
        assert!(request.validate().is_ok());
        request.code = "city gen!".into();
        assert!(request.validate().is_err());
    }
}
