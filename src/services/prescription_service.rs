//! Prescription service.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CreatePrescription, Prescription, PrescriptionFilter, Principal};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait PrescriptionService: Send + Sync {
    /// Issue a prescription with the caller as prescriber
    async fn create(
        &self,
        principal: &Principal,
        input: CreatePrescription,
    ) -> AppResult<Prescription>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: PrescriptionFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Prescription>>;

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Prescription>;

    /// Only the prescriber (or a `prescriptions:*` holder) may cancel
    async fn cancel(&self, principal: &Principal, id: Uuid) -> AppResult<Prescription>;
}

pub struct PrescriptionManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PrescriptionManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PrescriptionService for PrescriptionManager<U> {
    async fn create(
        &self,
        principal: &Principal,
        input: CreatePrescription,
    ) -> AppResult<Prescription> {
        let tenant_id = principal.tenant_id;
        let patient = self
            .uow
            .patients()
            .find_by_id(tenant_id, input.patient_id)
            .await?
            .ok_or_not_found("PATIENT_NOT_FOUND", "Patient")?;
        if !patient.is_active() {
            return Err(AppError::bad_request(
                "PATIENT_INACTIVE",
                "Cannot prescribe for an inactive patient",
            ));
        }

        let prescription = Prescription::new(
            tenant_id,
            patient.id,
            principal.staff_id,
            input.items,
            input.notes,
        )?;
        let prescription = self.uow.prescriptions().insert(&prescription).await?;
        tracing::info!(
            tenant = %tenant_id,
            prescription = %prescription.id,
            patient = %patient.id,
            items = prescription.items.len(),
            "Prescription issued"
        );
        Ok(prescription)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: PrescriptionFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Prescription>> {
        let (rows, total) = self
            .uow
            .prescriptions()
            .list(tenant_id, &filter, page)
            .await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Prescription> {
        self.uow
            .prescriptions()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_not_found("PRESCRIPTION_NOT_FOUND", "Prescription")
    }

    async fn cancel(&self, principal: &Principal, id: Uuid) -> AppResult<Prescription> {
        let mut prescription = self.get(principal.tenant_id, id).await?;
        principal.authorize("prescriptions:cancel", &prescription.attributes())?;

        prescription.cancel()?;
        let prescription = self.uow.prescriptions().update(&prescription).await?;
        tracing::info!(prescription = %id, by = %principal.staff_id, "Prescription cancelled");
        Ok(prescription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Gender, Patient, PermissionSet, PrescriptionItem, PrescriptionStatus, RecordStatus,
    };
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;
    use chrono::{NaiveDate, Utc};

    fn item(quantity: i32) -> PrescriptionItem {
        PrescriptionItem {
            medication: "Amoxicillin 500mg".into(),
            dosage: "1 capsule".into(),
            frequency: "every 8 hours".into(),
            route: Some("oral".into()),
            duration_days: Some(7),
            quantity,
            dispensed_quantity: 0,
        }
    }

    fn doctor(tenant_id: Uuid, permissions: &[&str]) -> Principal {
        Principal {
            staff_id: Uuid::new_v4(),
            tenant_id,
            department_id: None,
            email: "doc@citygen.org".into(),
            permissions: permissions.iter().copied().collect(),
        }
    }

    fn active_patient(tenant_id: Uuid) -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            tenant_id,
            mrn: "CITYGEN-20250101-00000A".into(),
            first_name: "Emeka".into(),
            last_name: "Nwosu".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1975, 5, 5).unwrap(),
            gender: Gender::Male,
            phone: None,
            email: None,
            address: None,
            blood_group: None,
            allergies: Vec::new(),
            department_id: None,
            primary_doctor_id: None,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_sets_prescriber_to_caller() {
        let tenant = Uuid::new_v4();
        let patient = active_patient(tenant);
        let patient_id = patient.id;

        let mut uow = TestUnitOfWork::default();
        uow.patients
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(patient.clone())));
        uow.prescriptions
            .expect_insert()
            .returning(|p| Ok(p.clone()));

        let service = PrescriptionManager::new(uow.build());
        let principal = doctor(tenant, &["prescriptions:create"]);
        let mut input_item = item(21);
        input_item.dispensed_quantity = 5;
        let prescription = service
            .create(
                &principal,
                CreatePrescription {
                    patient_id,
                    items: vec![input_item],
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(prescription.prescriber_id, principal.staff_id);
        assert_eq!(prescription.status, PrescriptionStatus::Active);
        assert_eq!(prescription.items[0].dispensed_quantity, 0);
    }

    #[tokio::test]
    async fn test_create_without_items() {
        let tenant = Uuid::new_v4();
        let patient = active_patient(tenant);
        let patient_id = patient.id;

        let mut uow = TestUnitOfWork::default();
        uow.patients
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(patient.clone())));
        uow.prescriptions.expect_insert().never();

        let service = PrescriptionManager::new(uow.build());
        let err = service
            .create(
                &doctor(tenant, &["prescriptions:create"]),
                CreatePrescription {
                    patient_id,
                    items: vec![],
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "EMPTY_PRESCRIPTION");
    }

    #[tokio::test]
    async fn test_only_prescriber_may_cancel() {
        let tenant = Uuid::new_v4();
        let prescription =
            Prescription::new(tenant, Uuid::new_v4(), Uuid::new_v4(), vec![item(10)], None)
                .unwrap();
        let id = prescription.id;

        let mut uow = TestUnitOfWork::default();
        uow.prescriptions
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(prescription.clone())));
        uow.prescriptions.expect_update().never();

        let service = PrescriptionManager::new(uow.build());
        let err = service
            .cancel(&doctor(tenant, &["prescriptions:cancel"]), id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "POLICY_DENIED");
    }

    #[tokio::test]
    async fn test_prescriber_cancels_untouched_prescription() {
        let tenant = Uuid::new_v4();
        let principal = doctor(tenant, &["prescriptions:cancel"]);
        let prescription =
            Prescription::new(tenant, Uuid::new_v4(), principal.staff_id, vec![item(10)], None)
                .unwrap();
        let id = prescription.id;

        let mut uow = TestUnitOfWork::default();
        uow.prescriptions
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(prescription.clone())));
        uow.prescriptions
            .expect_update()
            .returning(|p| Ok(p.clone()));

        let service = PrescriptionManager::new(uow.build());
        let cancelled = service.cancel(&principal, id).await.unwrap();
        assert_eq!(cancelled.status, PrescriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let mut uow = TestUnitOfWork::default();
        uow.prescriptions
            .expect_find_by_id()
            .returning(|_, _| Ok(None));
        let service = PrescriptionManager::new(uow.build());
        let err = service
            .get(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PRESCRIPTION_NOT_FOUND");
    }
}
