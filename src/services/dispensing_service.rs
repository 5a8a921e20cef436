//! Dispensing service - pharmacy hand-over against a prescription.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{DispenseOutcome, DispenseRequest, Dispensing, Principal};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[async_trait]
pub trait DispensingService: Send + Sync {
    /// Record a dispense by the caller and advance the prescription
    async fn dispense(
        &self,
        principal: &Principal,
        input: DispenseRequest,
    ) -> AppResult<DispenseOutcome>;

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Dispensing>;

    /// Oldest first
    async fn list_for_prescription(
        &self,
        tenant_id: Uuid,
        prescription_id: Uuid,
    ) -> AppResult<Vec<Dispensing>>;
}

pub struct DispensingManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DispensingManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> DispensingService for DispensingManager<U> {
    async fn dispense(
        &self,
        principal: &Principal,
        input: DispenseRequest,
    ) -> AppResult<DispenseOutcome> {
        let tenant_id = principal.tenant_id;
        let prescription_id = input.prescription_id;

        // Reject bad requests without opening a transaction
        let mut preview = self
            .uow
            .prescriptions()
            .find_by_id(tenant_id, prescription_id)
            .await?
            .ok_or_not_found("PRESCRIPTION_NOT_FOUND", "Prescription")?;
        preview.apply_dispense(&input.items)?;

        let pharmacist_id = principal.staff_id;
        let lines = input.items;
        let notes = input.notes;

        let outcome = with_transaction!(self.uow, |ctx| {
            let mut prescription = ctx
                .prescriptions()
                .find_for_update(tenant_id, prescription_id)
                .await?
                .ok_or_not_found("PRESCRIPTION_NOT_FOUND", "Prescription")?;
            prescription.apply_dispense(&lines)?;

            let record = Dispensing::record(&prescription, pharmacist_id, &lines, notes);
            let dispensing = ctx.dispensings().insert(&record).await?;
            let prescription = ctx.prescriptions().update(&prescription).await?;
            Ok(DispenseOutcome {
                dispensing,
                prescription,
            })
        })?;

        tracing::info!(
            tenant = %tenant_id,
            prescription = %prescription_id,
            dispensing = %outcome.dispensing.id,
            status = outcome.prescription.status.as_str(),
            "Medication dispensed"
        );
        Ok(outcome)
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Dispensing> {
        self.uow
            .dispensings()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_not_found("DISPENSING_NOT_FOUND", "Dispensing")
    }

    async fn list_for_prescription(
        &self,
        tenant_id: Uuid,
        prescription_id: Uuid,
    ) -> AppResult<Vec<Dispensing>> {
        self.uow
            .prescriptions()
            .find_by_id(tenant_id, prescription_id)
            .await?
            .ok_or_not_found("PRESCRIPTION_NOT_FOUND", "Prescription")?;
        self.uow
            .dispensings()
            .list_for_prescription(tenant_id, prescription_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DispenseLine, PermissionSet, Prescription, PrescriptionItem};
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;

    fn pharmacist(tenant_id: Uuid) -> Principal {
        Principal {
            staff_id: Uuid::new_v4(),
            tenant_id,
            department_id: None,
            email: "pharm@citygen.org".into(),
            permissions: PermissionSet::from_iter(["dispensing:create"]),
        }
    }

    fn prescription(tenant_id: Uuid) -> Prescription {
        let item = PrescriptionItem {
            medication: "Paracetamol 500mg".into(),
            dosage: "2 tablets".into(),
            frequency: "every 6 hours".into(),
            route: None,
            duration_days: Some(3),
            quantity: 24,
            dispensed_quantity: 0,
        };
        Prescription::new(tenant_id, Uuid::new_v4(), Uuid::new_v4(), vec![item], None).unwrap()
    }

    fn request(prescription_id: Uuid, item_index: usize, quantity: i32) -> DispenseRequest {
        DispenseRequest {
            prescription_id,
            items: vec![DispenseLine {
                item_index,
                quantity,
            }],
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_over_dispense_is_rejected_before_transaction() {
        let tenant = Uuid::new_v4();
        let record = prescription(tenant);
        let id = record.id;

        let mut uow = TestUnitOfWork::default();
        uow.prescriptions
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(record.clone())));

        let service = DispensingManager::new(uow.build());
        let err = service
            .dispense(&pharmacist(tenant), request(id, 0, 25))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "OVER_DISPENSE");
    }

    #[tokio::test]
    async fn test_unknown_item_index() {
        let tenant = Uuid::new_v4();
        let record = prescription(tenant);
        let id = record.id;

        let mut uow = TestUnitOfWork::default();
        uow.prescriptions
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(record.clone())));

        let service = DispensingManager::new(uow.build());
        let err = service
            .dispense(&pharmacist(tenant), request(id, 3, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ITEM");
    }

    #[tokio::test]
    async fn test_cancelled_prescription_cannot_be_dispensed() {
        let tenant = Uuid::new_v4();
        let mut record = prescription(tenant);
        record.cancel().unwrap();
        let id = record.id;

        let mut uow = TestUnitOfWork::default();
        uow.prescriptions
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(record.clone())));

        let service = DispensingManager::new(uow.build());
        let err = service
            .dispense(&pharmacist(tenant), request(id, 0, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS");
    }

    #[tokio::test]
    async fn test_missing_prescription() {
        let mut uow = TestUnitOfWork::default();
        uow.prescriptions
            .expect_find_by_id()
            .returning(|_, _| Ok(None));

        let service = DispensingManager::new(uow.build());
        let err = service
            .list_for_prescription(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PRESCRIPTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_missing_dispensing() {
        let mut uow = TestUnitOfWork::default();
        uow.dispensings
            .expect_find_by_id()
            .returning(|_, _| Ok(None));

        let service = DispensingManager::new(uow.build());
        let err = service
            .get(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DISPENSING_NOT_FOUND");
    }
}
