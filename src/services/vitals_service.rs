//! Vitals service - recording measurements and raising clinical alerts.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{generate_alerts, Patient, Principal, RecordVitals, Vitals};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait VitalsService: Send + Sync {
    /// Normalize, range-check and store a reading recorded by the caller
    async fn record(&self, principal: &Principal, input: RecordVitals) -> AppResult<Vitals>;

    async fn get(&self, principal: &Principal, id: Uuid) -> AppResult<Vitals>;

    /// Newest first
    async fn list_for_patient(
        &self,
        principal: &Principal,
        patient_id: Uuid,
        page: PaginationParams,
    ) -> AppResult<Paginated<Vitals>>;

    async fn latest_for_patient(
        &self,
        principal: &Principal,
        patient_id: Uuid,
    ) -> AppResult<Option<Vitals>>;
}

pub struct VitalsManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> VitalsManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Load the patient and check `permission` against its department
    async fn patient_for(
        &self,
        principal: &Principal,
        patient_id: Uuid,
        permission: &str,
    ) -> AppResult<Patient> {
        let patient = self
            .uow
            .patients()
            .find_by_id(principal.tenant_id, patient_id)
            .await?
            .ok_or_not_found("PATIENT_NOT_FOUND", "Patient")?;
        principal.authorize(permission, &patient.attributes())?;
        Ok(patient)
    }
}

#[async_trait]
impl<U: UnitOfWork> VitalsService for VitalsManager<U> {
    async fn record(&self, principal: &Principal, input: RecordVitals) -> AppResult<Vitals> {
        let patient = self
            .patient_for(principal, input.patient_id, "vitals:create")
            .await?;
        if !patient.is_active() {
            return Err(AppError::bad_request(
                "PATIENT_INACTIVE",
                "Cannot record vitals for an inactive patient",
            ));
        }

        let measurements = input.normalize()?;
        let alerts = generate_alerts(&measurements);

        let vitals = Vitals {
            id: Uuid::new_v4(),
            tenant_id: principal.tenant_id,
            patient_id: patient.id,
            recorded_by: principal.staff_id,
            measurements: measurements.rounded(),
            notes: input.notes,
            alerts,
            recorded_at: Utc::now(),
        };
        let vitals = self.uow.vitals().insert(&vitals).await?;

        if vitals.has_critical_alert() {
            let codes: Vec<&str> = vitals.alerts.iter().map(|a| a.code.as_str()).collect();
            tracing::warn!(
                tenant = %vitals.tenant_id,
                patient = %vitals.patient_id,
                alerts = ?codes,
                "Critical vitals recorded"
            );
        } else {
            tracing::info!(patient = %vitals.patient_id, vitals = %vitals.id, "Vitals recorded");
        }
        Ok(vitals)
    }

    async fn get(&self, principal: &Principal, id: Uuid) -> AppResult<Vitals> {
        let vitals = self
            .uow
            .vitals()
            .find_by_id(principal.tenant_id, id)
            .await?
            .ok_or_not_found("VITALS_NOT_FOUND", "Vitals record")?;
        self.patient_for(principal, vitals.patient_id, "vitals:read")
            .await?;
        Ok(vitals)
    }

    async fn list_for_patient(
        &self,
        principal: &Principal,
        patient_id: Uuid,
        page: PaginationParams,
    ) -> AppResult<Paginated<Vitals>> {
        self.patient_for(principal, patient_id, "vitals:read")
            .await?;
        let (rows, total) = self
            .uow
            .vitals()
            .list_for_patient(principal.tenant_id, patient_id, page)
            .await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn latest_for_patient(
        &self,
        principal: &Principal,
        patient_id: Uuid,
    ) -> AppResult<Option<Vitals>> {
        self.patient_for(principal, patient_id, "vitals:read")
            .await?;
        self.uow
            .vitals()
            .latest_for_patient(principal.tenant_id, patient_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertSeverity, Gender, PermissionSet, RecordStatus};
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;
    use chrono::NaiveDate;

    fn patient(tenant_id: Uuid, status: RecordStatus) -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            tenant_id,
            mrn: "CITYGEN-20250101-000001".into(),
            first_name: "Ngozi".into(),
            last_name: "Eze".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Female,
            phone: None,
            email: None,
            address: None,
            blood_group: None,
            allergies: Vec::new(),
            department_id: None,
            primary_doctor_id: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn nurse(tenant_id: Uuid) -> Principal {
        Principal {
            staff_id: Uuid::new_v4(),
            tenant_id,
            department_id: None,
            email: "nurse@citygen.org".into(),
            permissions: PermissionSet::from_iter(["vitals:create", "vitals:read"]),
        }
    }

    fn uow_with_patient(record: Patient) -> TestUnitOfWork {
        let mut uow = TestUnitOfWork::default();
        uow.patients
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(record.clone())));
        uow
    }

    #[tokio::test]
    async fn test_low_saturation_raises_critical_hypoxemia() {
        let tenant = Uuid::new_v4();
        let record = patient(tenant, RecordStatus::Active);
        let patient_id = record.id;
        let mut uow = uow_with_patient(record);
        uow.vitals.expect_insert().returning(|v| Ok(v.clone()));

        let service = VitalsManager::new(uow.build());
        let principal = nurse(tenant);
        let vitals = service
            .record(
                &principal,
                RecordVitals {
                    patient_id,
                    oxygen_saturation: Some(86.0),
                    heart_rate: Some(88),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(vitals.recorded_by, principal.staff_id);
        assert_eq!(vitals.alerts.len(), 1);
        assert_eq!(vitals.alerts[0].code, "CRITICAL_HYPOXEMIA");
        assert_eq!(vitals.alerts[0].severity, AlertSeverity::Critical);
        assert!(vitals.has_critical_alert());
    }

    #[tokio::test]
    async fn test_empty_reading_is_rejected() {
        let tenant = Uuid::new_v4();
        let record = patient(tenant, RecordStatus::Active);
        let patient_id = record.id;
        let mut uow = uow_with_patient(record);
        uow.vitals.expect_insert().never();

        let service = VitalsManager::new(uow.build());
        let err = service
            .record(
                &nurse(tenant),
                RecordVitals {
                    patient_id,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "EMPTY_VITALS");
    }

    #[tokio::test]
    async fn test_inactive_patient() {
        let tenant = Uuid::new_v4();
        let record = patient(tenant, RecordStatus::Inactive);
        let patient_id = record.id;
        let service = VitalsManager::new(uow_with_patient(record).build());

        let err = service
            .record(
                &nurse(tenant),
                RecordVitals {
                    patient_id,
                    heart_rate: Some(72),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PATIENT_INACTIVE");
    }

    #[tokio::test]
    async fn test_unknown_patient() {
        let mut uow = TestUnitOfWork::default();
        uow.patients.expect_find_by_id().returning(|_, _| Ok(None));
        let service = VitalsManager::new(uow.build());

        let err = service
            .latest_for_patient(&nurse(Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PATIENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_missing_vitals_record() {
        let mut uow = TestUnitOfWork::default();
        uow.vitals.expect_find_by_id().returning(|_, _| Ok(None));
        let service = VitalsManager::new(uow.build());

        let err = service
            .get(&nurse(Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VITALS_NOT_FOUND");
    }
}
